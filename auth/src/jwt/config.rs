use serde::Deserialize;

/// Signing configuration shared by every token the service issues.
///
/// Read once at startup and handed to [`crate::Authenticator::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// HS256 shared secret (at least 32 bytes recommended)
    pub secret: String,

    /// Value written to and required in the `iss` claim
    pub issuer: String,

    /// Lifetime of access tokens in seconds
    #[serde(default = "default_access_token_ttl_seconds")]
    pub access_token_ttl_seconds: i64,
}

fn default_access_token_ttl_seconds() -> i64 {
    60 * 60
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            access_token_ttl_seconds: default_access_token_ttl_seconds(),
        }
    }
}
