//! Narrow interfaces onto out-of-scope collaborators (spec §1): the
//! periodic scheduler calls into these but does not implement relational
//! persistence or cache infrastructure itself (SPEC_FULL §4.4, grounded in
//! `processClearExpiredAPIKeys`/`processClearRedisCache`).

use crate::error::SchedulerError;
use async_trait::async_trait;

/// Sweeps expired API keys from wherever they're persisted. A sweep error
/// is logged and does not stop the worker (spec §7's non-fatal handling).
#[async_trait]
pub trait ApiKeyExpirySweeper: Send + Sync {
    async fn sweep_expired_api_keys(&self) -> Result<(), SchedulerError>;
}

/// Purges whatever cache sits in front of symbol/price lookups.
#[async_trait]
pub trait CachePurger: Send + Sync {
    async fn purge(&self) -> Result<(), SchedulerError>;
}

/// A no-op sweeper/purger pair for demos and tests, or deployments that
/// have neither a key store nor a cache in front of them yet.
pub struct NoopMaintenance;

#[async_trait]
impl ApiKeyExpirySweeper for NoopMaintenance {
    async fn sweep_expired_api_keys(&self) -> Result<(), SchedulerError> {
        Ok(())
    }
}

#[async_trait]
impl CachePurger for NoopMaintenance {
    async fn purge(&self) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// Anything the scheduler can unconditionally tear down on market close,
/// independent of what message type it streams — lets the scheduler hold
/// `depth`/`ledger`/`notify` hubs as trait objects without being generic
/// over their payload types.
pub trait Disconnectable: Send + Sync {
    fn disconnect_all(&self);
}

impl<M: Clone + Send + Sync + 'static> Disconnectable for hub::Hub<M> {
    fn disconnect_all(&self) {
        hub::Hub::disconnect_all(self)
    }
}
