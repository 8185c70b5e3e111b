//! Request definitions
//!
//! A client request, as read off the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::task::Operation;

/// A parsed request frame: `{"op": ..., "data": ...}`
///
/// `op` is kept as a raw string so unsupported tags can be reported back
/// without failing the whole frame. Missing `op` means `echo`, missing
/// `data` means the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_op")]
    pub op: String,

    #[serde(default, deserialize_with = "stringify_data")]
    pub data: String,
}

impl Request {
    pub fn new(op: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            data: data.into(),
        }
    }

    /// Validate `op` against the allow-list
    pub fn operation(&self) -> Result<Operation> {
        self.op.parse()
    }
}

fn default_op() -> String {
    Operation::Echo.as_str().to_string()
}

/// Accept any JSON value for `data`: strings as-is, null as empty,
/// everything else in its JSON text form.
fn stringify_data<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
