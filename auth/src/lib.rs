//! Credential and token utilities for the account service.
//!
//! - Password hashing keyed by a per-user salt (HMAC-SHA256 or Argon2id)
//! - Refresh/access JWT issuance and verification
//! - Scope templates and route authorisation
//! - Random salts, rotation identifiers and passwords
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashAlgorithm, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashAlgorithm::HmacSha256);
//! let salt = auth::random::generate_salt();
//! let hash = hasher.hash("my_password", &salt).unwrap();
//! assert!(hasher.verify("my_password", &salt, &hash).unwrap());
//! ```
//!
//! ## Token Lifecycle
//! ```
//! use std::collections::HashMap;
//!
//! use auth::scope::{self, AuthRequirement};
//! use auth::{Authenticator, TokenConfig};
//!
//! let auth = Authenticator::new(&TokenConfig::new("secret_key_at_least_32_bytes_long!", "accounts"));
//!
//! let refresh = auth.sign_refresh(42, "rotation-id", vec![scope::REFRESH.to_string()]).unwrap();
//! let claims = auth
//!     .authorize(&refresh, &AuthRequirement::refresh(&[scope::REFRESH]), &HashMap::new())
//!     .unwrap();
//!
//! let access = auth.sign_access(42, vec![scope::user_scope(42)]).unwrap();
//! let params = HashMap::from([("id".to_string(), "42".to_string())]);
//! auth.authorize(&access, &AuthRequirement::access(&[scope::ADMIN, scope::USER_ID]), &params)
//!     .unwrap();
//! # assert_eq!(claims.sub.as_deref(), Some("42"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod random;
pub mod scope;

// Re-export commonly used items
pub use authenticator::AuthorizationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenConfig;
pub use jwt::TokenKind;
pub use password::HashAlgorithm;
pub use password::PasswordError;
pub use password::PasswordHasher;
