//! Chat payload encode/decode.
//!
//! Round-trip contract: `decode(encode(u, m)) == (u, m)` for all
//! strings, including empty strings and arbitrary text content.
//!
//! A note that fails to decode is not an error condition for the
//! scanner -- it is simply not a chat message. The [`decode_payload`]
//! caller decides; this module only reports the failure.

use serde::{Deserialize, Serialize};

use notechat_types::{NotechatError, Result};

// ---------------------------------------------------------------------------
// ChatPayload
// ---------------------------------------------------------------------------

/// The wire form of a chat message: the only fields that are actually
/// transmitted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Display name chosen by the sender.
    pub username: String,
    /// The message text.
    pub message: String,
}

impl ChatPayload {
    /// Builds a payload from username and text.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Encodes a payload into transaction note bytes.
pub fn encode_payload(payload: &ChatPayload) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| NotechatError::CodecError {
        reason: format!("couldn't encode chat payload: {e}"),
    })
}

/// Decodes transaction note bytes into a payload.
///
/// Fails for any byte sequence that is not a valid encoded payload.
/// Callers must treat the failure as "not a chat message", never as
/// a fatal condition.
pub fn decode_payload(note: &[u8]) -> Result<ChatPayload> {
    serde_json::from_slice(note).map_err(|e| NotechatError::CodecError {
        reason: format!("couldn't decode chat payload: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
