//! Storage key generation.
//!
//! Keys are a 256-bit random token, hex encoded, followed by the upload's
//! extension. Uniqueness comes from the token size alone; existing storage is
//! never consulted.

use std::fmt;

/// Length in bytes of the random part of a key.
const TOKEN_BYTES: usize = 32;

/// Collision-free name an accepted upload is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a fresh storage key for a normalized extension (e.g. `.dwg`).
pub fn generate_key(extension: &str) -> StorageKey {
    let token: [u8; TOKEN_BYTES] = rand::random();
    StorageKey(format!("{}{}", hex::encode(token), extension))
}
