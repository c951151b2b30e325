use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Credential material (`password_hash`, `salt`, `jti`) and flags never
/// leave the service; see [`UserProfile`] for the externally visible part.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub display_name: Option<DisplayName>,
    pub password_hash: String,
    pub salt: String,
    pub jti: String,
    pub active: bool,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Safe projection returned by user-facing reads.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// The only user fields that may appear in responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: Username,
    pub email: EmailAddress,
    pub display_name: Option<DisplayName>,
}

/// User unique identifier type, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(UserId(id)),
            _ => Err(UserIdError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-30 characters and strictly alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 30;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 30 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional human readable name, 3-30 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 30;

    pub fn new(display_name: String) -> Result<Self, DisplayNameError> {
        let length = display_name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(display_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password accepted for storage (at least 6 characters).
///
/// Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Row to insert; the store assigns id, flags and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub display_name: Option<DisplayName>,
    pub password_hash: String,
    pub salt: String,
    pub jti: String,
}

/// Conjunctive row filter for store lookups and conditional writes.
///
/// Unset fields do not constrain the match. `salt` and `jti` act as
/// preconditions: a write only applies if the row still holds the value the
/// caller read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<EmailAddress>,
    pub active: Option<bool>,
    pub salt: Option<String>,
    pub jti: Option<String>,
}

impl UserFilter {
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_email(email: EmailAddress) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }

    /// Restrict to active users when `only_active` is set.
    pub fn active_only(mut self, only_active: bool) -> Self {
        if only_active {
            self.active = Some(true);
        }
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_jti(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Whether a user row satisfies every constraint of the filter.
    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.email.as_ref().map_or(true, |email| &user.email == email)
            && self.active.map_or(true, |active| user.active == active)
            && self.salt.as_ref().map_or(true, |salt| &user.salt == salt)
            && self.jti.as_ref().map_or(true, |jti| &user.jti == jti)
    }
}

/// Partial column update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub display_name: Option<DisplayName>,
    pub password_hash: Option<String>,
    pub salt: Option<String>,
    pub jti: Option<String>,
}

impl UserChanges {
    pub fn rotate_jti(jti: impl Into<String>) -> Self {
        Self {
            jti: Some(jti.into()),
            ..Self::default()
        }
    }

    /// New password digest together with the salt it was computed with.
    pub fn credentials(password_hash: String, salt: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            salt: Some(salt),
            ..Self::default()
        }
    }

    /// Apply the changes to an in-memory user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(display_name) = &self.display_name {
            user.display_name = Some(display_name.clone());
        }
        if let Some(password_hash) = &self.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(salt) = &self.salt {
            user.salt = salt.clone();
        }
        if let Some(jti) = &self.jti {
            user.jti = jti.clone();
        }
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub display_name: Option<DisplayName>,
    /// Also log the user in and return a refresh and an access token
    pub return_token: bool,
}

/// Command to exchange email and password for a refresh token
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

/// Command to update profile fields; only provided fields change.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub display_name: Option<DisplayName>,
}

impl From<UpdateUserCommand> for UserChanges {
    fn from(command: UpdateUserCommand) -> Self {
        Self {
            username: command.username,
            email: command.email,
            display_name: command.display_name,
            ..Self::default()
        }
    }
}

/// Command to replace a password, given the current one.
///
/// Callers have already checked that `new_password` differs from
/// `password` and was confirmed.
#[derive(Debug)]
pub struct UpdatePasswordCommand {
    pub password: String,
    pub new_password: Password,
}

/// Tokens minted for a freshly registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub refresh_token: String,
    pub access_token: String,
}

/// Outcome of a registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub tokens: Option<TokenPair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId(1),
            username: Username::new("test".to_string()).unwrap(),
            email: EmailAddress::new("t@x.com".to_string()).unwrap(),
            display_name: None,
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
            jti: "jti".to_string(),
            active: true,
            admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_id_parsing() {
        assert_eq!(UserId::from_string("42"), Ok(UserId(42)));
        assert!(UserId::from_string("0").is_err());
        assert!(UserId::from_string("-3").is_err());
        assert!(UserId::from_string("abc").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(Username::new("test".to_string()).is_ok());
        assert_eq!(
            Username::new("ab".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
        assert_eq!(
            Username::new("a".repeat(31)),
            Err(UsernameError::TooLong {
                max: 30,
                actual: 31
            })
        );
        assert_eq!(
            Username::new("with_underscore".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_email_rules() {
        assert!(EmailAddress::new("t@x.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_display_name_and_password_rules() {
        assert!(DisplayName::new("John Doe".to_string()).is_ok());
        assert!(DisplayName::new("Jo".to_string()).is_err());
        assert!(Password::new("123456".to_string()).is_ok());
        assert_eq!(
            Password::new("12345".to_string()),
            Err(PasswordPolicyError::TooShort { min: 6, actual: 5 })
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("supersecret".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("supersecret"));
    }

    #[test]
    fn test_profile_only_exposes_safe_fields() {
        let profile = user().profile();
        assert_eq!(profile.username.as_str(), "test");
        assert_eq!(profile.email.as_str(), "t@x.com");
        assert!(profile.display_name.is_none());
    }

    #[test]
    fn test_filter_matching() {
        let mut user = user();

        assert!(UserFilter::by_id(UserId(1)).matches(&user));
        assert!(!UserFilter::by_id(UserId(2)).matches(&user));
        assert!(UserFilter::by_id(UserId(1))
            .with_jti("jti")
            .matches(&user));
        assert!(!UserFilter::by_id(UserId(1))
            .with_salt("other")
            .matches(&user));

        user.active = false;
        assert!(UserFilter::by_id(UserId(1)).active_only(false).matches(&user));
        assert!(!UserFilter::by_id(UserId(1)).active_only(true).matches(&user));
    }

    #[test]
    fn test_changes_apply_only_provided_fields() {
        let mut user = user();
        let changes = UserChanges {
            display_name: Some(DisplayName::new("Jane Doe".to_string()).unwrap()),
            ..UserChanges::rotate_jti("next")
        };

        changes.apply_to(&mut user);

        assert_eq!(user.jti, "next");
        assert_eq!(user.display_name.unwrap().as_str(), "Jane Doe");
        assert_eq!(user.username.as_str(), "test");
        assert_eq!(user.salt, "salt");
    }
}
