use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Which half of the refresh/access pair a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Long-lived token tied to the user's rotation identifier.
    Refresh,
    /// Short-lived token carrying resource scopes.
    Access,
}

/// JWT claims carried by both token kinds.
///
/// Refresh tokens carry `jti` and no `exp`; access tokens carry `exp` and no
/// `jti`. Everything else is shared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Rotation identifier, refresh tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Granted scopes
    #[serde(default)]
    pub scope: Vec<String>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims for a refresh token: subject, rotation identifier and scope,
    /// issued now, never expiring.
    pub fn refresh(user_id: impl ToString, jti: impl ToString, scope: Vec<String>) -> Self {
        Self::new()
            .with_subject(user_id)
            .with_issued_at(Utc::now().timestamp())
            .with_jti(jti)
            .with_scope(scope)
    }

    /// Claims for an access token expiring `ttl` after now.
    pub fn access(user_id: impl ToString, scope: Vec<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self::new()
            .with_subject(user_id)
            .with_issued_at(now.timestamp())
            .with_expiration((now + ttl).timestamp())
            .with_scope(scope)
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set rotation identifier.
    pub fn with_jti(mut self, jti: impl ToString) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Replace the granted scopes.
    pub fn with_scope(mut self, scope: Vec<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }

    /// Token kind inferred from the claims, if they describe either kind.
    pub fn kind(&self) -> Option<TokenKind> {
        match (&self.jti, self.exp) {
            (Some(_), None) => Some(TokenKind::Refresh),
            (None, Some(_)) => Some(TokenKind::Access),
            _ => None,
        }
    }
}
