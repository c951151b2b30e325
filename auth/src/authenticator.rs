use std::collections::HashMap;

use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenConfig;
use crate::scope::AuthRequirement;

/// Token issuance and request authorisation.
///
/// Signs refresh and access tokens with the configured issuer and decides
/// whether a presented token satisfies a route's [`AuthRequirement`].
pub struct Authenticator {
    jwt_handler: JwtHandler,
    access_token_ttl: Duration,
}

/// Reasons a presented token is refused.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Token cannot be used here")]
    WrongTokenKind,

    #[error("Insufficient scope")]
    Forbidden,
}

impl Authenticator {
    /// Create a new authenticator.
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            jwt_handler: JwtHandler::new(config.secret.as_bytes(), config.issuer.as_str()),
            access_token_ttl: Duration::seconds(config.access_token_ttl_seconds),
        }
    }

    /// Sign a refresh token. No expiry; invalidated by rotating `jti`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign_refresh(
        &self,
        user_id: impl ToString,
        jti: &str,
        scope: Vec<String>,
    ) -> Result<String, JwtError> {
        let claims = Claims::refresh(user_id, jti, scope).with_issuer(self.jwt_handler.issuer());
        self.jwt_handler.encode(&claims)
    }

    /// Sign an access token expiring after the configured lifetime.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign_access(&self, user_id: impl ToString, scope: Vec<String>) -> Result<String, JwtError> {
        let claims = Claims::access(user_id, scope, self.access_token_ttl)
            .with_issuer(self.jwt_handler.issuer());
        self.jwt_handler.encode(&claims)
    }

    /// Validate signature, issuer and expiry, returning the claims.
    ///
    /// Scope is not inspected here.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.sub.is_none() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        Ok(claims)
    }

    /// Verify a token and check it against a route requirement.
    ///
    /// # Arguments
    /// * `token` - Bearer token presented by the client
    /// * `requirement` - Strategy and scope templates declared by the route
    /// * `params` - Path parameters of the matched route
    ///
    /// # Errors
    /// * `InvalidToken` - Verification failed
    /// * `WrongTokenKind` - Refresh token on an access route or vice versa
    /// * `Forbidden` - No granted scope satisfies the requirement
    pub fn authorize(
        &self,
        token: &str,
        requirement: &AuthRequirement,
        params: &HashMap<String, String>,
    ) -> Result<Claims, AuthorizationError> {
        let claims = self.verify(token)?;

        match claims.kind() {
            Some(kind) if requirement.strategy.accepts(kind) => {}
            _ => return Err(AuthorizationError::WrongTokenKind),
        }

        if !requirement.is_satisfied_by(&claims.scope, params) {
            return Err(AuthorizationError::Forbidden);
        }

        Ok(claims)
    }
}
