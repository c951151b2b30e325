use serde::Deserialize;

/// Per-operation switch deciding whether store lookups add `active = true`.
///
/// Deactivated users can still be revoked, updated or deleted by default,
/// but cannot log in or be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActiveFilterPolicy {
    pub login: bool,
    pub read: bool,
    pub update: bool,
    pub update_password: bool,
    pub reset_password: bool,
    pub revoke: bool,
    pub delete: bool,
    pub exchange: bool,
}

impl Default for ActiveFilterPolicy {
    fn default() -> Self {
        Self {
            login: true,
            read: true,
            update: false,
            update_password: false,
            reset_password: false,
            revoke: false,
            delete: false,
            exchange: false,
        }
    }
}

/// Behaviour knobs of the account service, loaded from the `users` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountPolicy {
    pub active_filter: ActiveFilterPolicy,
    /// Reject refresh tokens whose `jti` no longer matches the stored one.
    pub enforce_refresh_rotation: bool,
    pub reset_password_length: usize,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            active_filter: ActiveFilterPolicy::default(),
            enforce_refresh_rotation: true,
            reset_password_length: auth::random::GENERATED_PASSWORD_LENGTH,
        }
    }
}
