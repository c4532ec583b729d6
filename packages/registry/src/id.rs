use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Base-36 digits needed to encode any `u64` (36^13 > 2^64).
const DRAW_LEN: usize = 13;

/// Opaque identifier of a file record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh id from two independent random draws.
    ///
    /// Each draw is encoded as 13 base-36 digits, giving a 26-character
    /// lowercase alphanumeric string with 128 bits of entropy.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(DRAW_LEN * 2);
        push_base36(&mut id, rng.random::<u64>());
        push_base36(&mut id, rng.random::<u64>());
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_base36(out: &mut String, mut value: u64) {
    let mut digits = [b'0'; DRAW_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    out.extend(digits.iter().map(|&b| b as char));
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
