use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("loading exchange calendar: {0}")]
    Calendar(#[from] calendar::CalendarError),
    #[error("api key expiry sweep failed: {0}")]
    Sweep(String),
    #[error("cache purge failed: {0}")]
    Purge(String),
}
