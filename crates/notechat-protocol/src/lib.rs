//! Wire payload codec.
//!
//! The only cross-implementation contract in the system: a chat
//! payload travels in a ledger transaction note as the JSON object
//! `{"username": <string>, "message": <string>}`. Everything else a
//! consumer sees (round, address prefix, reputation) is receiver-side
//! enrichment and never serialized here.

pub mod payload;

pub use payload::{decode_payload, encode_payload, ChatPayload};
