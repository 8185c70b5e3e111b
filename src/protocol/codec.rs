//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//! One UTF-8 JSON document per line, `\n`-terminated, in both directions.
//! A trailing `\r` is tolerated on input.

use std::io::{BufRead, ErrorKind, Read, Write};

use crate::error::{RelayError, Result};

use super::{Request, Response};

/// Maximum frame size (1 MB), excluding the newline
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request as one newline-terminated frame
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    encode_frame(request)
}

/// Decode a request from one frame (without the newline)
///
/// Only a JSON object is a request; arrays and scalars are rejected.
pub fn decode_request(line: &str) -> Result<Request> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| RelayError::Protocol(format!("invalid JSON request: {}", e)))?;
    if !value.is_object() {
        return Err(RelayError::Protocol(
            "invalid JSON request: expected an object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| RelayError::Protocol(format!("invalid JSON request: {}", e)))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response as one newline-terminated frame
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    encode_frame(response)
}

/// Decode a response from one frame (without the newline)
pub fn decode_response(line: &str) -> Result<Response> {
    serde_json::from_str(line)
        .map_err(|e| RelayError::Protocol(format!("invalid JSON response: {}", e)))
}

// =============================================================================
// Stream I/O
// =============================================================================

/// Read one frame from a stream.
///
/// Returns:
/// - `Ok(Some(bytes))` — a frame, newline stripped (may not be valid UTF-8)
/// - `Ok(None)` — clean EOF before any byte of a new frame
/// - `Err(Protocol)` — frame longer than [`MAX_FRAME_SIZE`]; the rest of it
///   is discarded, so the next call starts at the following frame
///
/// A final frame without a trailing newline is still returned.
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let limit = (MAX_FRAME_SIZE + 1) as u64;
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_FRAME_SIZE {
        discard_line(reader)?;
        return Err(RelayError::Protocol(format!(
            "frame exceeds {} bytes",
            MAX_FRAME_SIZE
        )));
    }

    Ok(Some(buf))
}

/// Write a request frame to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writer.write_all(&encode_request(request)?)?;
    writer.flush()?;
    Ok(())
}

/// Write a response frame to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response)?)?;
    writer.flush()?;
    Ok(())
}

/// Read a response frame from a stream (client side)
///
/// EOF before a response is reported as `UnexpectedEof`.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before response",
        )
    })?;
    let line = String::from_utf8(frame)
        .map_err(|_| RelayError::Protocol("response is not valid UTF-8".to_string()))?;
    decode_response(&line)
}

/// Skip bytes up to and including the next newline (or EOF)
fn discard_line<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        let (found, used) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

fn encode_frame<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}
