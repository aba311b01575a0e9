//! The per-stream subscriber hub (C5), grounded in `app/WSHub.go`: client
//! multiplexing by user id and connection id, broadcast/addressed delivery,
//! and replay-since-timestamp with at-most-once-delivery-during-backfill
//! semantics (spec §4.5).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

/// A logged or in-flight message: `target_user == 0` means broadcast to
/// everyone, any other value addresses one user's connections only.
#[derive(Clone, Debug)]
pub struct Envelope<M> {
    pub target_user: i64,
    pub timestamp_ms: i64,
    pub payload: M,
}

/// Sentinel user id meaning "every subscriber", per spec §4.5.
pub const BROADCAST_USER: i64 = 0;

struct SyncState<M> {
    syncing: bool,
    pending: Vec<Envelope<M>>,
}

struct ClientState<M> {
    sender: mpsc::UnboundedSender<M>,
    sync: Mutex<SyncState<M>>,
}

/// One stream's live subscriber set plus its today's-messages log. The
/// exchange service owns one `Hub` per stream (depth, ledger, notify,
/// session).
pub struct Hub<M> {
    clients: RwLock<HashMap<i64, HashMap<String, Arc<ClientState<M>>>>>,
    log: Mutex<Vec<Envelope<M>>>,
    /// `false` closes and evicts any existing connection for a user before
    /// registering a new one (the session hub, per `routes/ws/session.go`'s
    /// `NewWSHub(false)`); `true` allows multiple concurrent connections
    /// per user (the default for depth/ledger/notify).
    allow_multi_connect: bool,
}

impl<M: Clone + Send + Sync + 'static> Hub<M> {
    pub fn new(allow_multi_connect: bool) -> Self {
        Self { clients: RwLock::new(HashMap::new()), log: Mutex::new(Vec::new()), allow_multi_connect }
    }

    /// Registers a new client connection. Returns the receiving half of its
    /// outbound channel; the caller's connection task forwards whatever
    /// arrives on it to the transport, and treats the channel closing
    /// (because the hub dropped its sender) as a signal to close the
    /// socket.
    pub fn register(&self, user_id: i64, conn_id: impl Into<String>) -> mpsc::UnboundedReceiver<M> {
        let conn_id = conn_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(ClientState { sender: tx, sync: Mutex::new(SyncState { syncing: false, pending: Vec::new() }) });

        let mut clients = self.clients.write().unwrap();
        let conns = clients.entry(user_id).or_default();
        if !self.allow_multi_connect {
            conns.clear(); // dropping prior senders closes their receivers
        }
        conns.insert(conn_id, state);
        rx
    }

    pub fn unregister(&self, user_id: i64, conn_id: &str) {
        let mut clients = self.clients.write().unwrap();
        if let Some(conns) = clients.get_mut(&user_id) {
            conns.remove(conn_id);
            if conns.is_empty() {
                clients.remove(&user_id);
            }
        }
    }

    /// Closes every connection and clears all client state.
    pub fn disconnect_all(&self) {
        self.clients.write().unwrap().clear();
    }

    /// Wipes the message log (end-of-day reset).
    pub fn clear_messages(&self) {
        self.log.lock().unwrap().clear();
    }

    fn deliver_or_buffer(&self, state: &Arc<ClientState<M>>, envelope: &Envelope<M>) -> bool {
        let mut sync = state.sync.lock().unwrap();
        if sync.syncing {
            sync.pending.push(envelope.clone());
            return true;
        }
        drop(sync);
        state.sender.send(envelope.payload.clone()).is_ok()
    }

    fn fan_out(&self, envelope: Envelope<M>, targets: Option<i64>) {
        self.log.lock().unwrap().push(envelope.clone());

        let snapshot: Vec<(i64, String, Arc<ClientState<M>>)> = {
            let clients = self.clients.read().unwrap();
            match targets {
                Some(user_id) => clients
                    .get(&user_id)
                    .map(|conns| conns.iter().map(|(c, s)| (user_id, c.clone(), s.clone())).collect())
                    .unwrap_or_default(),
                None => clients
                    .iter()
                    .flat_map(|(u, conns)| conns.iter().map(move |(c, s)| (*u, c.clone(), s.clone())))
                    .collect(),
            }
        };

        let mut dead = Vec::new();
        for (user_id, conn_id, state) in snapshot {
            if !self.deliver_or_buffer(&state, &envelope) {
                dead.push((user_id, conn_id));
            }
        }
        for (user_id, conn_id) in dead {
            tracing::warn!(user_id, conn_id = %conn_id, "dropping subscriber after failed send");
            self.unregister(user_id, &conn_id);
        }
    }

    /// Delivers `message` to every currently registered client, logging it
    /// as a broadcast (`target_user = 0`) so later replay sees it for any
    /// user.
    pub fn broadcast(&self, timestamp_ms: i64, message: M) {
        self.fan_out(Envelope { target_user: BROADCAST_USER, timestamp_ms, payload: message }, None);
    }

    /// Delivers `message` only to `user_id`'s connections, logging it
    /// addressed to that user.
    pub fn send_to_user(&self, user_id: i64, timestamp_ms: i64, message: M) {
        self.fan_out(Envelope { target_user: user_id, timestamp_ms, payload: message }, Some(user_id));
    }

    /// Replays today's log since `since_ms` to one client, then drains
    /// whatever arrived while replaying, with no gap and no duplicate
    /// delivery (spec §4.5 / §8 scenario 6).
    ///
    /// Returns `false` if the client is not currently registered.
    pub fn replay_since(&self, user_id: i64, conn_id: &str, since_ms: i64) -> bool {
        let state = {
            let clients = self.clients.read().unwrap();
            match clients.get(&user_id).and_then(|conns| conns.get(conn_id)) {
                Some(state) => state.clone(),
                None => return false,
            }
        };

        {
            let mut sync = state.sync.lock().unwrap();
            sync.syncing = true;
        }

        let snapshot: Vec<Envelope<M>> = self.log.lock().unwrap().clone();
        for envelope in &snapshot {
            if (envelope.target_user == BROADCAST_USER || envelope.target_user == user_id)
                && envelope.timestamp_ms > since_ms
            {
                let _ = state.sender.send(envelope.payload.clone());
            }
        }

        // This critical section must cover the drain: no broadcast may slip
        // a message into `pending` between us clearing `syncing` and our
        // having already sent everything currently in `pending` (spec
        // §4.5's locking note).
        let mut sync = state.sync.lock().unwrap();
        sync.syncing = false;
        for envelope in sync.pending.drain(..) {
            if envelope.target_user == BROADCAST_USER || envelope.target_user == user_id {
                let _ = state.sender.send(envelope.payload);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all<M>(rx: &mut mpsc::UnboundedReceiver<M>) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(m) = rx.try_recv() {
            out.push(m);
        }
        out
    }

    #[test]
    fn broadcast_reaches_every_registered_client() {
        let hub: Hub<&'static str> = Hub::new(true);
        let mut a = hub.register(1, "a");
        let mut b = hub.register(2, "b");

        hub.broadcast(100, "hello");

        assert_eq!(drain_all(&mut a), vec!["hello"]);
        assert_eq!(drain_all(&mut b), vec!["hello"]);
    }

    #[test]
    fn send_to_user_is_addressed() {
        let hub: Hub<&'static str> = Hub::new(true);
        let mut a = hub.register(1, "a");
        let mut b = hub.register(2, "b");

        hub.send_to_user(1, 100, "just for you");

        assert_eq!(drain_all(&mut a), vec!["just for you"]);
        assert!(drain_all(&mut b).is_empty());
    }

    #[test]
    fn single_connection_hub_evicts_prior_connection() {
        let hub: Hub<&'static str> = Hub::new(false);
        let mut first = hub.register(1, "first");
        let _second = hub.register(1, "second");

        // The first connection's receiver observes its sender was dropped.
        assert!(first.try_recv().is_err());
        hub.broadcast(1, "only-for-second");
        // first's channel is gone; only second would see it, but we didn't
        // keep a handle here — absence of a panic/leak is the assertion.
    }

    #[test]
    fn replay_since_merges_backfill_and_live_traffic_exactly_once() {
        let hub: Hub<i64> = Hub::new(true);
        hub.broadcast(10, 1);
        hub.broadcast(20, 2);

        let mut rx = hub.register(7, "conn");
        // Concurrently-arriving broadcast during the (synchronous, in this
        // test) replay window would land in `pending`; here we just assert
        // ordinary replay-since correctness, then a live message after.
        hub.replay_since(7, "conn", 10);
        hub.broadcast(30, 3);

        assert_eq!(drain_all(&mut rx), vec![2, 3]);
    }

    #[test]
    fn unregister_removes_empty_user_entry() {
        let hub: Hub<&'static str> = Hub::new(true);
        let _rx = hub.register(5, "only");
        hub.unregister(5, "only");
        assert!(!hub.replay_since(5, "only", 0));
    }
}
