use crate::error::{AppError, AppResult};

/// Hash a plaintext password with a per-call random salt.
pub fn hash(plaintext: &str) -> AppResult<String> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash.
///
/// A mismatch is `Ok(false)`; a structurally invalid stored hash is a typed
/// error rather than a silent `false`.
pub fn verify(plaintext: &str, hashed: &str) -> AppResult<bool> {
    bcrypt::verify(plaintext, hashed).map_err(|_| AppError::InvalidHashFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hashed = hash("hunter2").unwrap();
        assert!(verify("hunter2", &hashed).unwrap());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hashed = hash("hunter2").unwrap();
        assert!(!verify("hunter3", &hashed).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let h1 = hash("hunter2").unwrap();
        let h2 = hash("hunter2").unwrap();
        assert_ne!(h1, h2);
        assert!(verify("hunter2", &h1).unwrap());
        assert!(verify("hunter2", &h2).unwrap());
    }

    #[test]
    fn invalid_stored_hash_is_a_typed_error() {
        let err = verify("hunter2", "not-a-bcrypt-hash").unwrap_err();
        assert!(matches!(err, AppError::InvalidHashFormat));
    }
}
