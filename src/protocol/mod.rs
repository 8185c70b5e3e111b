//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (newline-delimited JSON)
//!
//! ### Request
//! ```text
//! {"op": "uppercase" | "hash" | "echo", "data": "<payload>"}\n
//! ```
//!
//! ### Response
//! ```text
//! {"status": "ok", "task_id": "...", "worker": "worker-3", "result": "...", "artifact_path": "..."}\n
//! {"status": "error", "message": "..."}\n
//! ```
//!
//! A malformed or rejected request gets an error frame; the connection
//! stays open.

mod codec;
mod request;
mod response;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_frame,
    read_response, write_request, write_response, MAX_FRAME_SIZE,
};
pub use request::Request;
pub use response::Response;
