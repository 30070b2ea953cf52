//! Password hashing and verification helpers.
//!
//! bcrypt with the library default cost. The cost is deliberately not
//! configurable; both servers treat the hash as an opaque byte sequence.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::tool::error::AppError;

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> Result<Vec<u8>, AppError> {
    let hashed = hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hashed.into_bytes())
}

/// Verifies a password against a stored hash. A hash that is not valid
/// bcrypt output is an internal failure, not a mismatch.
pub fn verify_password(password: &str, pass_hash: &[u8]) -> Result<bool, AppError> {
    let encoded = std::str::from_utf8(pass_hash)
        .map_err(|e| AppError::Internal(format!("stored hash is not valid UTF-8: {e}")))?;
    verify(password, encoded)
        .map_err(|e| AppError::Internal(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "pw1";
        let hashed = hash_password(password).expect("hash");

        assert_ne!(hashed, password.as_bytes());
        assert!(verify_password(password, &hashed).expect("verify"));
        assert!(!verify_password("wrong", &hashed).expect("verify wrong"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Salted: two hashes of the same input must differ.
        let first = hash_password("pw1").expect("hash");
        let second = hash_password("pw1").expect("hash");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_corrupt_hash() {
        let result = verify_password("pw1", b"not-a-bcrypt-hash");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
