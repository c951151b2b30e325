use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use super::errors::PasswordError;

type HmacSha256 = Hmac<Sha256>;

/// Keyed digest of a password: HMAC-SHA256 with the salt as key.
///
/// # Returns
/// Lower-case hex string (64 characters)
pub fn digest(password: &str, salt: &str) -> Result<String, PasswordError> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    mac.update(password.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recompute the digest and compare it with the stored one.
///
/// A stored digest that is not valid hex never matches.
pub fn verify(password: &str, salt: &str, stored: &str) -> Result<bool, PasswordError> {
    let Ok(expected) = hex::decode(stored) else {
        return Ok(false);
    };

    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;
    mac.update(password.as_bytes());

    Ok(mac.verify_slice(&expected).is_ok())
}
