//! Password digests
//!
//! Argon2id with a random per-account salt. The account id is mixed into the
//! hashed input, so a digest copied onto another account row does not verify.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Derive the PHC-format digest stored in `users.password`
pub fn derive_digest(
    account_id: i64,
    password: &str,
) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(&digest_input(account_id, password), &salt)?
        .to_string();
    Ok(digest)
}

/// Check `password` against a stored digest. Malformed digests never verify.
pub fn verify_digest(account_id: i64, password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        tracing::warn!(account_id, "Stored password digest is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(&digest_input(account_id, password), &parsed)
        .is_ok()
}

fn digest_input(account_id: i64, password: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(8 + password.len());
    input.extend_from_slice(&account_id.to_be_bytes());
    input.extend_from_slice(password.as_bytes());
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_and_verify() {
        let digest = derive_digest(42, "correct horse").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_digest(42, "correct horse", &digest));
        assert!(!verify_digest(42, "wrong horse", &digest));
    }

    #[test]
    fn test_digest_bound_to_account() {
        let digest = derive_digest(1, "secret").unwrap();
        assert!(!verify_digest(2, "secret", &digest));
    }

    #[test]
    fn test_salts_differ() {
        let a = derive_digest(1, "secret").unwrap();
        let b = derive_digest(1, "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest() {
        assert!(!verify_digest(1, "secret", "not-a-phc-string"));
        assert!(!verify_digest(1, "secret", ""));
    }
}
