//! Credential hashing.
//!
//! Argon2 with a fresh random salt per digest. The output is a PHC-format
//! string that embeds salt and cost parameters, so `verify_password` needs
//! no configuration to recompute. Cost factors are tunable by swapping the
//! `Argon2` instance for one built with explicit `argon2::Params`.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// Hash a plaintext credential into a salted, irreversible digest.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(digest)
}

/// Verify a plaintext credential against a stored digest.
///
/// An unparseable digest verifies as false rather than erroring; a corrupt
/// stored digest must read as "wrong password", not a server fault.
pub fn verify_password(digest: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(digest) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}
