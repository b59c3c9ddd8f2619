/// Password Hashing and Verification
///
/// bcrypt with a configurable cost. bcrypt compares digests in constant time,
/// so verification time does not depend on where a mismatch occurs.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns an internal error if the cost is out of range or hashing fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// Returns `Ok(false)` on mismatch. A digest that is not valid bcrypt output
/// is a storage-layer fault and comes back as an internal error.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    verify(password, digest)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "pw123456";
        let digest = hash_password(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, digest);
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("pw123456", TEST_COST).unwrap();
        let b = hash_password("pw123456", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let digest = hash_password("pw123456", TEST_COST).unwrap();
        assert!(verify_password("pw123456", &digest).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let digest = hash_password("pw123456", TEST_COST).unwrap();
        assert!(!verify_password("pw654321", &digest).unwrap());
    }

    #[test]
    fn test_cost_is_encoded_in_digest() {
        let digest = hash_password("pw123456", 10).unwrap();
        assert!(digest.contains("$10$"));
    }

    #[test]
    fn test_malformed_digest_is_internal_error() {
        let result = verify_password("pw123456", "not-a-bcrypt-digest");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_invalid_cost_is_internal_error() {
        let result = hash_password("pw123456", 99);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
