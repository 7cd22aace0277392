//! Outbound message model
//!
//! The only payload a session ever sends: a `SAY` event carrying a short
//! random utterance. Built fresh on every send tick, never persisted.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random token embedded in each utterance
const TOKEN_LEN: usize = 5;

/// Wire payload sent as a text frame: `{"event":"SAY","message":"..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outbound {
    pub event: String,
    pub message: String,
}

impl Outbound {
    /// Build a fresh `SAY` message with a new 5-character random token
    pub fn say() -> Self {
        Self {
            event: "SAY".to_string(),
            message: format!("I'm saying {}", random_token(TOKEN_LEN)),
        }
    }

    /// Serialize to the wire representation
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Generate a random alphanumeric token of the given length
fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
