//! The system state file (spec §6): `{initial_accept_code: bool}`, guarding
//! one-time setup of the bootstrap admin token on first boot. Grounded
//! directly in `sys/sys.go`'s `Get`/`Edit`, the same mtime-cached
//! read/atomic-replace-write shape as [`calendar::Calendar`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemStateError {
    #[error("reading system state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing system state file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SystemState {
    pub initial_accept_code: bool,
}

struct Cached {
    state: SystemState,
    mtime: SystemTime,
}

/// The admin-provisioning bootstrap flow itself (issuing and validating the
/// token) is out of scope per spec §1; this only gates whether that
/// one-time setup still needs to run.
pub struct SystemStateStore {
    path: PathBuf,
    cache: std::sync::Mutex<Option<Cached>>,
}

impl SystemStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cache: std::sync::Mutex::new(None) }
    }

    pub fn load(&self) -> Result<SystemState, SystemStateError> {
        let mtime = std::fs::metadata(&self.path)?.modified()?;

        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.as_ref() {
            if cached.mtime >= mtime {
                return Ok(cached.state);
            }
        }

        let data = std::fs::read_to_string(&self.path)?;
        let state: SystemState = serde_json::from_str(&data)?;
        *cache = Some(Cached { state, mtime });
        Ok(state)
    }

    pub fn mark_bootstrap_used(&self) -> Result<(), SystemStateError> {
        let state = SystemState { initial_accept_code: false };
        write_atomic(&self.path, &state)?;
        *self.cache.lock().unwrap() = None;
        Ok(())
    }
}

fn write_atomic(path: &Path, state: &SystemState) -> Result<(), SystemStateError> {
    let data = serde_json::to_string_pretty(state)?;
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_mark_used() {
        let dir = std::env::temp_dir().join(format!("sys-state-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sys.json");
        std::fs::write(&path, r#"{"initial_accept_code": true}"#).unwrap();

        let store = SystemStateStore::new(&path);
        assert!(store.load().unwrap().initial_accept_code);

        store.mark_bootstrap_used().unwrap();
        assert!(!store.load().unwrap().initial_accept_code);

        std::fs::remove_dir_all(&dir).ok();
    }
}
