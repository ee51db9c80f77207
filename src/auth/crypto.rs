use sha2::{Digest, Sha256};

/// Tokens are stored hashed; the external auth service writes the same
/// SHA-256 hex digest when it mints a session.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_hex_sha256() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn distinct_tokens_hash_differently() {
        assert_ne!(hash_token("a"), hash_token("b"));
    }
}
