//! Opaque pagination cursors.
//!
//! A cursor is the base64 form of a decimal 1-based row position, so
//! `Cursor::encode(6)` denotes "row 6" of the overall result.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Cursor is not valid base64")]
    InvalidEncoding,

    #[error("Cursor does not hold a row position")]
    InvalidPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn encode(position: u64) -> Self {
        Cursor(BASE64_ENGINE.encode(position.to_string()))
    }

    /// Wraps a cursor string received from a client without validating it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Cursor(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_decode(&self) -> Result<u64, CursorError> {
        try_decode(&self.0)
    }

    /// Row position, or 0 for anything that does not decode.
    pub fn decode(&self) -> u64 {
        decode(&self.0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode(position: u64) -> String {
    Cursor::encode(position).0
}

pub fn try_decode(raw: &str) -> Result<u64, CursorError> {
    let bytes = BASE64_ENGINE
        .decode(raw.trim())
        .map_err(|_| CursorError::InvalidEncoding)?;
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|digits| digits.trim().parse::<u64>().ok())
        .ok_or(CursorError::InvalidPosition)
}

/// Permissive decode: malformed cursors are treated as row 0.
pub fn decode(raw: &str) -> u64 {
    match try_decode(raw) {
        Ok(position) => position,
        Err(e) => {
            tracing::warn!("Cursor '{}' decoded as 0: {}", raw, e);
            0
        }
    }
}
