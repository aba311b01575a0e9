//! Real-time fan-out fabric: the subscriber hub (C5) and the chunked
//! trade/depth buffer (C6), per spec §4.5/§4.6.

mod buffer;
mod hub;

pub use buffer::{ChunkedBuffer, DEFAULT_CHUNK_SIZE};
pub use hub::{Envelope, Hub, BROADCAST_USER};
