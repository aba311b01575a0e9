//! The exchange configuration document (spec §6), grounded directly in
//! `exchanges/exchanges.go`'s `ExchangeType`/`Load`/`Edit`: a weekly session
//! template plus date-specific anniversary/holiday overrides, loaded with
//! modification-time-based caching and edited via an atomic file replace.

use crate::error::CalendarError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

/// One session's open/close pair in `HH:MM` local time. Either side may be
/// absent, meaning the session does not run that day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub open: Option<String>,
    pub close: Option<String>,
}

/// A date-specific override that replaces all three sessions for that date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anniversary {
    pub date: String,
    pub name: String,
    pub pre_market_sessions: Session,
    pub regular_trading_sessions: Session,
    pub post_market_sessions: Session,
}

/// The exchange configuration document, field-for-field with spec §6.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    pub short_name: String,
    pub country: String,
    pub default_currency: String,
    pub default_utc_offset: i32,
    pub default_timezone: String,
    #[serde(default)]
    pub available_types: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    pub pre_market_sessions: HashMap<String, Session>,
    pub regular_trading_sessions: HashMap<String, Session>,
    pub post_market_sessions: HashMap<String, Session>,
    #[serde(default)]
    pub anniversaries: Vec<Anniversary>,
}

impl ExchangeConfig {
    /// The override in effect for `date` (`YYYY-MM-DD`), if any.
    pub fn anniversary_on(&self, date: &str) -> Option<&Anniversary> {
        self.anniversaries.iter().find(|a| a.date == date)
    }
}

struct Cached {
    mtime: SystemTime,
    config: ExchangeConfig,
}

/// Lazily loads and caches one exchange's configuration file, invalidating
/// the cache on `edit` or when the file's mtime advances past what was last
/// read — generalizing `exchanges.go`'s file-scope `cachedExchange`/
/// `lastModTime` globals into an owned handle (spec §9).
pub struct Calendar {
    path: PathBuf,
    cache: Mutex<Option<Cached>>,
}

impl Calendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cache: Mutex::new(None) }
    }

    /// Returns the current configuration, reloading from disk only if the
    /// file's mtime has advanced since the last successful load.
    pub fn load(&self) -> Result<ExchangeConfig, CalendarError> {
        let metadata = std::fs::metadata(&self.path)?;
        let mtime = metadata.modified()?;

        let mut guard = self.cache.lock().unwrap();
        let needs_reload = match guard.as_ref() {
            Some(cached) => mtime > cached.mtime,
            None => true,
        };

        if needs_reload {
            let data = std::fs::read_to_string(&self.path)?;
            let config: ExchangeConfig = serde_json::from_str(&data)?;
            *guard = Some(Cached { mtime, config: config.clone() });
            return Ok(config);
        }

        Ok(guard.as_ref().unwrap().config.clone())
    }

    /// Replaces the configuration document on disk (pretty-printed, written
    /// to a temp file then renamed into place so readers never see a
    /// partial write) and invalidates the cache. Callers should `load()`
    /// first, mutate the returned value, and pass it back here.
    pub fn edit(&self, config: &ExchangeConfig) -> Result<(), CalendarError> {
        let data = serde_json::to_string_pretty(config)?;
        let tmp_path = tmp_path_for(&self.path);
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &self.path)?;
        *self.cache.lock().unwrap() = None;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = tmp.file_name().and_then(|n| n.to_str()).unwrap_or("exchange").to_string();
    tmp.set_file_name(format!("{file_name}.tmp"));
    tmp
}
