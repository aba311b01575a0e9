use crate::wire::OrderRequestWire;
use orderbook::Side;

/// What the caller is asking the book to do. Corresponds to `Order.status`
/// transitions named in spec §3's lifecycle note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Open,
    Modified,
    Canceled,
}

/// A fully addressed submission: the client-supplied [`OrderRequestWire`]
/// plus everything the route/auth layer is responsible for attaching
/// (spec §6's starred fields).
#[derive(Clone, Debug)]
pub struct SubmitRequest {
    pub action: Action,
    pub symbol: String,
    pub side: Side,
    pub user_id: i64,
    pub timestamp_ms: i64,
    pub wire: OrderRequestWire,
}
