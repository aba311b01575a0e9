//! The session calendar (C3): the exchange configuration document, session
//! derivation, and the mtime-cached/atomically-edited config loader, per
//! spec §4.3 and grounded in `exchanges/exchanges.go`.

mod config;
mod error;
mod session;

pub use config::{Anniversary, Calendar, ExchangeConfig, Session};
pub use error::CalendarError;
pub use session::{current_session, next_change_times, ChangeTimes, SessionKind, SessionStatus};
