//! Subscribe endpoint client
//!
//! Wire types for `POST /api/subscribe` and the transports that carry
//! a request to the audience backend.

mod protocol;
mod transport;

pub use protocol::{SubscribeRequest, CONNECTIVITY_MESSAGE};
pub use transport::{
    build_transport, Accepted, RequestError, SubscribeTransport, TestModeTransport,
};
