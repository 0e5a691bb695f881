//! Deterministic hash primitive for the audit chain.
//!
//! All chain and data hashes in this crate go through [`sha256_hex`], which is
//! synchronous and produces byte-identical output for byte-identical input on
//! every platform.

use sha2::{Digest, Sha256};

/// Hashes `bytes` with SHA-256 and returns the 64-character lowercase hex
/// digest.
#[must_use]
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vectors() {
        // FIPS 180-2 test vector.
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn output_is_lowercase_hex_of_fixed_width() {
        let digest = sha256_hex("sentinel");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn deterministic_for_identical_input() {
        assert_eq!(sha256_hex(b"payload"), sha256_hex(b"payload"));
        assert_ne!(sha256_hex(b"payload"), sha256_hex(b"payload "));
    }
}
