//! Password hashing and verification using bcrypt
//!
//! bcrypt only folds the first 72 bytes of input into the hash. Rather
//! than relying on whatever a given backend does with longer input, this
//! module truncates explicitly so the policy is visible and testable:
//! two passwords that agree on their first 72 bytes are the same password.

use bcrypt::DEFAULT_COST;
use thiserror::Error;

/// bcrypt's input limit in bytes
const BCRYPT_MAX_BYTES: usize = 72;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(#[from] bcrypt::BcryptError),
}

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

/// Hash a plaintext password using bcrypt
///
/// A fresh random salt is generated per call, so hashing the same
/// password twice yields different hashes. The returned string embeds
/// the algorithm version, cost, and salt and is safe to store as-is.
///
/// # Example
///
/// ```no_run
/// use booklynn_api::auth::password::hash_password;
///
/// let hash = hash_password("open sesame").expect("Failed to hash password");
/// // Output: $2b$12$...
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hash a password with an explicit bcrypt cost factor
///
/// Lower costs are useful in tests; production code should go through
/// [`hash_password`].
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(truncated(password), cost)?)
}

/// Verify a plaintext password against a stored hash
///
/// Applies the same 72-byte truncation as [`hash_password`]. A malformed
/// stored hash verifies as `false`; it never panics or propagates an
/// error, since a corrupt row must read as "wrong password", not as an
/// outage.
///
/// # Example
///
/// ```no_run
/// use booklynn_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("open sesame").unwrap();
/// assert!(verify_password("open sesame", &hash));
/// assert!(!verify_password("wrong", &hash));
/// ```
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(truncated(password), hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // MIN_COST keeps the hashing rounds cheap in tests
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "correct horse battery staple";
        let hash = hash_password_with_cost(password, TEST_COST).expect("Failed to hash password");

        assert!(verify_password(password, &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        // Fresh salt per call
        let password = "same password";

        let hash1 = hash_password_with_cost(password, TEST_COST).unwrap();
        let hash2 = hash_password_with_cost(password, TEST_COST).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1));
        assert!(verify_password(password, &hash2));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "$2b$12$truncated"));
    }

    #[test]
    fn test_truncation_at_72_bytes() {
        let prefix = "a".repeat(72);
        let long_a = format!("{prefix}-first-tail");
        let long_b = format!("{prefix}-second-tail");
        let hash = hash_password_with_cost(&long_a, TEST_COST).unwrap();

        // Identical first 72 bytes means identical password
        assert!(verify_password(&long_b, &hash));

        // A difference inside the first 72 bytes still matters
        let mut divergent = prefix.clone();
        divergent.replace_range(70..71, "b");
        assert!(!verify_password(&divergent, &hash));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_roundtrip_verifies(password in "\\PC{0,100}") {
            let hash = hash_password_with_cost(&password, TEST_COST).unwrap();
            prop_assert!(verify_password(&password, &hash));
        }
    }
}
