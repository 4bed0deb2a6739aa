//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10). Fresh salt per call.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; errors only on a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext() {
        let hash = hash_password("pw12345678").expect("hash");
        assert_ne!(hash, "pw12345678");
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn hashing_twice_gives_different_digests() {
        // Fresh salt per call
        let a = hash_password("pw12345678").expect("hash");
        let b = hash_password("pw12345678").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_roundtrip() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(verify_password("correct horse", &hash).expect("verify"));
        assert!(!verify_password("wrong horse", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        assert!(verify_password("anything", "not-a-bcrypt-digest").is_err());
    }
}
