//! Operation tags
//!
//! The closed allow-list of operations a task may carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Operations the workers know how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Upper-case the payload
    Uppercase,

    /// SHA-256 of the payload, lowercase hex
    Hash,

    /// Payload prefixed with `echo:`
    Echo,
}

impl Operation {
    /// Every accepted tag, in wire form
    pub const ALL: [Operation; 3] = [Operation::Uppercase, Operation::Hash, Operation::Echo];

    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Uppercase => "uppercase",
            Operation::Hash => "hash",
            Operation::Echo => "echo",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| RelayError::UnsupportedOperation(s.to_string()))
    }
}
