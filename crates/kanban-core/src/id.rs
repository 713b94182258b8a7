//! ID generation for lists, cards and comments
//!
//! Uses hash-based IDs: a v4 UUID plus the current timestamp, hashed and
//! encoded as lowercase base32.
//! Format: prefix-xxxxxxxx (8 lowercase alphanumeric chars)

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const LIST_PREFIX: &str = "list";
pub const CARD_PREFIX: &str = "card";
pub const COMMENT_PREFIX: &str = "cmt";

const ID_HASH_CHARS: usize = 8;

/// Generate an ID with the given prefix
pub fn generate_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4();
    let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(uuid.as_bytes());
    hasher.update(timestamp.to_le_bytes());

    let hash = hasher.finalize();

    // 5 bytes encode to exactly 8 base32 chars
    let encoded = base32::encode(base32::Alphabet::Crockford, &hash[..5])
        .to_lowercase()
        .chars()
        .take(ID_HASH_CHARS)
        .collect::<String>();

    format!("{}-{}", prefix, encoded)
}

/// Generate an ID that `taken` reports as unused
pub fn generate_unique_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id(prefix);
        if !taken(&id) {
            return id;
        }
    }
}
