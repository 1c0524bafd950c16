//! Opaque pagination cursors
//!
//! A cursor is the base64 form of a surrogate key's decimal digits. It is
//! not signed: a client can forge a cursor for any key it can guess. Treat
//! it as a convenience token, not an access control.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a cursor string fails to decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("cursor payload is not valid UTF-8")]
    NotUtf8,

    #[error("cursor payload is not a non-negative integer: {0:?}")]
    NotNumeric(String),
}

/// Encode a surrogate key as an opaque cursor
pub fn encode(id: i64) -> String {
    STANDARD.encode(id.to_string())
}

/// Decode a cursor back to its surrogate key
///
/// Only plain ASCII digits are accepted in the payload: no sign, no
/// whitespace, nothing beyond `i64::MAX`.
pub fn decode(cursor: &str) -> Result<i64, CursorError> {
    let bytes = STANDARD.decode(cursor)?;
    let text = String::from_utf8(bytes).map_err(|_| CursorError::NotUtf8)?;

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CursorError::NotNumeric(text));
    }

    text.parse::<i64>().map_err(|_| CursorError::NotNumeric(text))
}

/// What to do with a cursor that fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidCursorPolicy {
    /// Ignore the cursor and serve the first page
    #[default]
    Restart,
    /// Report the failure so the request can be refused
    Reject,
}

/// Turn an optional client cursor into the key to resume after
///
/// Returns `Ok(None)` when there is no cursor, or when a malformed cursor is
/// dropped under [`InvalidCursorPolicy::Restart`].
pub fn resolve(
    cursor: Option<&str>,
    policy: InvalidCursorPolicy,
) -> Result<Option<i64>, CursorError> {
    let Some(raw) = cursor.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    match decode(raw) {
        Ok(id) => Ok(Some(id)),
        Err(e) => match policy {
            InvalidCursorPolicy::Restart => {
                tracing::warn!("Ignoring malformed cursor {:?}: {}", raw, e);
                Ok(None)
            }
            InvalidCursorPolicy::Reject => Err(e),
        },
    }
}
