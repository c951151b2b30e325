use argon2::Argon2;

use super::errors::PasswordError;

/// Output length of the raw Argon2id hash in bytes.
const OUTPUT_LEN: usize = 32;

/// Deterministic Argon2id hash of a password with a caller-provided salt.
///
/// Unlike PHC strings, the salt is not embedded in the output; the caller
/// stores it next to the digest.
///
/// # Errors
/// * `HashingFailed` - Salt shorter than 8 bytes or Argon2 failure
pub fn digest(password: &str, salt: &str) -> Result<String, PasswordError> {
    let mut output = [0u8; OUTPUT_LEN];

    Argon2::default()
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(hex::encode(output))
}

/// Recompute the Argon2id digest and compare it with the stored one.
pub fn verify(password: &str, salt: &str, stored: &str) -> Result<bool, PasswordError> {
    let computed =
        digest(password, salt).map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

    Ok(computed == stored)
}
