//! Owner secret generation
//!
//! Every protected document gets an administrative secret that is distinct
//! from the reader's access password and never shown to anyone.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use super::secure_memory::SecureString;

/// Number of random bytes behind an owner secret
pub const OWNER_SECRET_BYTES: usize = 32;

/// Generate a fresh hex-encoded owner secret from the OS random source
pub fn generate_owner_secret() -> SecureString {
    let mut bytes = [0u8; OWNER_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let secret = SecureString::new(hex::encode(bytes));
    bytes.zeroize();
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_secret_shape() {
        let secret = generate_owner_secret();
        assert_eq!(secret.len(), OWNER_SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_owner_secrets_differ() {
        assert_ne!(generate_owner_secret(), generate_owner_secret());
    }
}
