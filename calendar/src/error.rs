use thiserror::Error;

/// Calendar/config load failures (spec §7): on any of these the engine
/// keeps the last known session status; callers see it until the next
/// successful load.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("reading exchange config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing exchange config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid time value: {0}")]
    InvalidTime(String),
}
