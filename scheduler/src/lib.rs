//! The periodic scheduler (C4): a minute-aligned worker pool that polls the
//! session calendar, sweeps expired API keys, purges caches, and tears
//! down the market-data subscriber fabric ten minutes after close, per
//! spec §4.4 and grounded in `exchanges/channels/workerPool.go`.

mod error;
mod pool;
mod traits;

pub use error::SchedulerError;
pub use pool::Scheduler;
pub use traits::{ApiKeyExpirySweeper, CachePurger, Disconnectable, NoopMaintenance};
