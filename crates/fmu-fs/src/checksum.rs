//! SHA-256 checksum utilities
//!
//! Checksums use the canonical format `sha256:<hex>`. The cache uses a short
//! prefix of the hex digest to tell revision snapshots apart.

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content as `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// First `len` hex characters of the content digest, without the prefix.
pub fn short_checksum(content: &str, len: usize) -> String {
    let full = compute_content_checksum(content);
    full[PREFIX.len()..].chars().take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_checksum_known_value() {
        let checksum = compute_content_checksum("hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn short_checksum_is_a_prefix_of_the_digest() {
        assert_eq!(short_checksum("hello world", 8), "b94d27b9");
    }

    #[test]
    fn different_content_different_checksum() {
        assert_ne!(compute_content_checksum("aaa"), compute_content_checksum("bbb"));
    }
}
