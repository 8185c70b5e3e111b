//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking, polled for shutdown)
//! - One thread per connection, capped by `max_connections`
//! - Requests routed through the Engine

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
