//! Password hashing for account credentials.
//!
//! PBKDF2-HMAC-SHA256 with a per-user random salt. The plain password is
//! never stored; verification re-derives and compares the hash.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

pub const PBKDF2_ITERATIONS: u32 = 120_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

/// Derive a password hash from a password and salt.
pub fn derive_hash(password: &str, salt: &[u8; SALT_LENGTH]) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}

/// Hash a new password with a fresh random salt. Returns (hash, salt).
pub fn hash_password(password: &str) -> ([u8; HASH_LENGTH], [u8; SALT_LENGTH]) {
    let salt = generate_salt();
    (derive_hash(password, &salt), salt)
}

/// Check a login attempt against the stored hash + salt.
pub fn verify_password(
    password: &str,
    salt: &[u8; SALT_LENGTH],
    expected: &[u8; HASH_LENGTH],
) -> bool {
    &derive_hash(password, salt) == expected
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
