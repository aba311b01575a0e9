//! The minute-aligned worker pool (C4), grounded in
//! `exchanges/channels/workerPool.go`: three workers draining a
//! capacity-five job queue, fed once a minute by a dispatcher that aligns
//! to the next wall-clock minute boundary.

use crate::traits::{ApiKeyExpirySweeper, CachePurger, Disconnectable};
use calendar::{Calendar, SessionKind, SessionStatus};
use chrono::{Duration as ChronoDuration, NaiveTime, Timelike};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

const WORKER_COUNT: usize = 3;
const QUEUE_CAPACITY: usize = 5;
const DISCONNECT_DELAY: Duration = Duration::from_secs(10 * 60);

#[derive(Clone, Copy, Debug)]
enum Job {
    SessionPoll,
    ApiKeySweep,
    CachePurge,
}

/// Encodes `SessionKind::Closed` as a sentinel so the "previous session"
/// cell can be a plain atomic without a lock; any real session value is one
/// of the four `SessionKind` discriminants.
fn encode(kind: SessionKind) -> i64 {
    match kind {
        SessionKind::Pre => 0,
        SessionKind::Regular => 1,
        SessionKind::Post => 2,
        SessionKind::Closed => 3,
    }
}

fn decode(code: i64) -> SessionKind {
    match code {
        0 => SessionKind::Pre,
        1 => SessionKind::Regular,
        2 => SessionKind::Post,
        _ => SessionKind::Closed,
    }
}

/// Ties the session calendar (C3) to the subscriber hubs (C5): polls the
/// calendar every wall-clock minute, publishes session transitions and
/// pre-market countdowns, and tears down the market-data hubs ten minutes
/// after close.
pub struct Scheduler {
    calendar: Arc<Calendar>,
    session_hub: Arc<hub::Hub<SessionStatus>>,
    market_hubs: Vec<Arc<dyn Disconnectable>>,
    api_key_sweeper: Arc<dyn ApiKeyExpirySweeper>,
    cache_purger: Arc<dyn CachePurger>,
    previous_session: AtomicI64,
    /// Guards against scheduling more than one pending disconnect timer if
    /// several `post -> closed` ticks are somehow observed back to back.
    /// `Arc`-wrapped so the delayed task can reset it on its own schedule,
    /// independent of any particular `&self` borrow's lifetime.
    disconnect_scheduled: Arc<Mutex<bool>>,
}

impl Scheduler {
    pub fn new(
        calendar: Arc<Calendar>,
        session_hub: Arc<hub::Hub<SessionStatus>>,
        market_hubs: Vec<Arc<dyn Disconnectable>>,
        api_key_sweeper: Arc<dyn ApiKeyExpirySweeper>,
        cache_purger: Arc<dyn CachePurger>,
    ) -> Self {
        Self {
            calendar,
            session_hub,
            market_hubs,
            api_key_sweeper,
            cache_purger,
            previous_session: AtomicI64::new(encode(SessionKind::Closed)),
            disconnect_scheduled: Arc::new(Mutex::new(false)),
        }
    }

    /// Spawns the dispatcher and the fixed worker pool. The returned handle
    /// may be dropped; the pool keeps running detached, matching the
    /// reference's `RunWorkerPool` fire-and-forget shape.
    pub fn spawn(self: Arc<Self>) {
        let (tx, rx) = mpsc::channel::<Job>(QUEUE_CAPACITY);

        // tokio's mpsc has exactly one receiver; WORKER_COUNT concurrency is
        // expressed as a semaphore bounding how many jobs run at once rather
        // than N dedicated consumer loops racing for a shared queue — the
        // idiomatic translation of the reference's fixed worker pool.
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run_workers(rx).await });

        tokio::spawn(async move { self.dispatch_loop(tx).await });
    }

    async fn run_workers(self: Arc<Self>, mut rx: mpsc::Receiver<Job>) {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(WORKER_COUNT));
        while let Some(job) = rx.recv().await {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let scheduler = self.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(err) = scheduler.process_job(job).await {
                    tracing::error!(?job, %err, "scheduler job failed");
                }
            });
        }
    }

    async fn process_job(&self, job: Job) -> Result<(), crate::error::SchedulerError> {
        match job {
            Job::SessionPoll => self.session_poll().await,
            Job::ApiKeySweep => self.api_key_sweeper.sweep_expired_api_keys().await,
            Job::CachePurge => self.cache_purge().await,
        }
    }

    async fn dispatch_loop(self: Arc<Self>, tx: mpsc::Sender<Job>) {
        let now = chrono::Local::now().naive_local();
        let since_minute_start = ChronoDuration::seconds(now.time().second() as i64)
            + ChronoDuration::nanoseconds(now.time().nanosecond() as i64);
        let next_minute = now - since_minute_start + ChronoDuration::minutes(1);
        let wait = (next_minute - now).to_std().unwrap_or(Duration::from_secs(0));
        tokio::time::sleep(wait).await;

        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            self.enqueue_tick(&tx).await;
        }
    }

    async fn enqueue_tick(&self, tx: &mpsc::Sender<Job>) {
        for job in [Job::SessionPoll, Job::ApiKeySweep, Job::CachePurge] {
            if tx.try_send(job).is_err() {
                tracing::warn!(?job, "scheduler workers busy, dropping tick");
            }
        }
    }

    async fn session_poll(&self) -> Result<(), crate::error::SchedulerError> {
        let cfg = self.calendar.load()?;
        let now = chrono::Local::now().naive_local();
        let current = calendar::current_session(&cfg, now);
        let previous = decode(self.previous_session.load(Ordering::SeqCst));

        self.emit_premarket_countdowns(&cfg, now);

        if previous != current {
            self.previous_session.store(encode(current), Ordering::SeqCst);
            self.session_hub.broadcast(now_millis(now), SessionStatus::from(current));

            if previous == SessionKind::Post && current == SessionKind::Closed {
                self.schedule_post_close_disconnect();
            }
        }
        Ok(())
    }

    fn emit_premarket_countdowns(&self, cfg: &calendar::ExchangeConfig, now: chrono::NaiveDateTime) {
        let Some(pre_open) = calendar::next_change_times(cfg, now).pre else { return };
        let current_minute = truncate_to_minute(now.time());

        let markers = [
            (pre_open - ChronoDuration::minutes(30), SessionStatus::Pre30m),
            (pre_open - ChronoDuration::minutes(5), SessionStatus::Pre5m),
            (pre_open - ChronoDuration::minutes(1), SessionStatus::Pre1m),
        ];
        for (target, status) in markers {
            if current_minute == target {
                self.session_hub.broadcast(now_millis(now), status);
            }
        }
    }

    fn schedule_post_close_disconnect(&self) {
        let mut scheduled = self.disconnect_scheduled.lock().unwrap();
        if *scheduled {
            return;
        }
        *scheduled = true;

        let hubs = self.market_hubs.clone();
        let flag = self.disconnect_scheduled.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DISCONNECT_DELAY).await;
            for hub in &hubs {
                hub.disconnect_all();
            }
            *flag.lock().unwrap() = false;
        });
    }

    async fn cache_purge(&self) -> Result<(), crate::error::SchedulerError> {
        let cfg = self.calendar.load()?;
        let now = chrono::Local::now().naive_local();
        let times = calendar::next_change_times(&cfg, now);
        let current = decode(self.previous_session.load(Ordering::SeqCst));

        let Some(pre_open) = times.pre else { return Ok(()) };
        let purge_at = pre_open - ChronoDuration::minutes(30);

        if current == SessionKind::Closed && truncate_to_minute(now.time()) == purge_at {
            self.cache_purger.purge().await?;
        }
        Ok(())
    }
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap()
}

fn now_millis(now: chrono::NaiveDateTime) -> i64 {
    now.and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_kind_encoding_roundtrips() {
        for kind in [SessionKind::Pre, SessionKind::Regular, SessionKind::Post, SessionKind::Closed] {
            assert_eq!(decode(encode(kind)), kind);
        }
    }

    #[test]
    fn truncate_drops_seconds_and_sub_second() {
        let t = NaiveTime::from_hms_milli_opt(8, 30, 45, 250).unwrap();
        assert_eq!(truncate_to_minute(t), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }
}
