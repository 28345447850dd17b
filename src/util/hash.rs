//! Hashing utilities for environment fingerprinting.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_str_stable() {
        assert_eq!(sha256_str("abc"), sha256_str("abc"));
        assert_ne!(sha256_str("abc"), sha256_str("abd"));
        assert_eq!(sha256_str("abc"), sha256_bytes(b"abc"));
    }
}
