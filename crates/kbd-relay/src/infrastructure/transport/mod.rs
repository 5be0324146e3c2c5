//! Transport implementations.
//!
//! - [`websocket`]: the real thing, one Tokio task per connection.
//! - [`mock`]: records dials, frames and closes for tests.

pub mod mock;
pub mod websocket;

pub use websocket::{WsConnection, WsConnector};
