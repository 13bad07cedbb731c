pub mod connection;
pub mod websocket;

pub use connection::{ConnectionContext, GatewaySession};
