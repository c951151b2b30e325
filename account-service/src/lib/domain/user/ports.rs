use async_trait::async_trait;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::models::UpdatePasswordCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::user::errors::NotificationError;
use crate::user::errors::UserError;

/// Port for account and token operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create a new user, optionally logging them in.
    ///
    /// # Arguments
    /// * `command` - Validated username, email, password and display name
    ///
    /// # Returns
    /// Created user, plus a refresh and an access token when requested
    ///
    /// # Errors
    /// * `AlreadyExists` - Username or email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Registration, UserError>;

    /// Exchange email and password for a refresh token, rotating `jti`.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password
    /// * `RowCountMismatch` - The conditional write did not touch exactly one row
    /// * `DatabaseError` - Database operation failed
    async fn issue_refresh_token(&self, command: LoginCommand) -> Result<String, UserError>;

    /// Exchange verified refresh token claims for an access token.
    ///
    /// # Errors
    /// * `InvalidToken` - Subject is malformed, or `jti` was rotated since signing
    /// * `DatabaseError` - Database operation failed
    async fn issue_access_token(&self, claims: &auth::Claims) -> Result<String, UserError>;

    /// Rotate the user's `jti`, invalidating outstanding refresh tokens.
    ///
    /// # Returns
    /// Number of rows affected
    ///
    /// # Errors
    /// * `Unauthorized` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn revoke(&self, id: &UserId) -> Result<u64, UserError>;

    /// Retrieve a user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist (or is inactive, per policy)
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update profile fields of a user.
    ///
    /// # Errors
    /// * `NotFound` - No row was updated
    /// * `DatabaseError` - Database operation failed, including unique violations
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<(), UserError>;

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `PasswordIncorrect` - Current password does not match
    /// * `ConcurrentModification` - Credentials changed between read and write
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        id: &UserId,
        command: UpdatePasswordCommand,
    ) -> Result<(), UserError>;

    /// Replace the password with a generated one delivered out-of-band.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `ConcurrentModification` - Credentials changed between read and write
    /// * `DatabaseError` - Database operation failed
    async fn reset_password(&self, id: &UserId) -> Result<(), UserError>;

    /// Delete a user.
    ///
    /// # Errors
    /// * `NotFound` - No row was deleted
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Arguments
    /// * `user` - Row to insert
    ///
    /// # Returns
    /// Stored user with its assigned id and defaults
    ///
    /// # Errors
    /// * `AlreadyExists` - Username or email is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve the first user matching every constraint of `filter`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, UserError>;

    /// Apply `changes` to rows matching `filter`.
    ///
    /// # Returns
    /// Number of rows affected
    ///
    /// # Errors
    /// * `AlreadyExists` - New username or email is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, filter: &UserFilter, changes: &UserChanges)
        -> Result<u64, UserError>;

    /// Remove at most one row matching `filter`.
    ///
    /// # Returns
    /// Number of rows affected
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, filter: &UserFilter) -> Result<u64, UserError>;
}

/// Out-of-band delivery of generated credentials.
#[async_trait]
pub trait CredentialNotifier: Send + Sync + 'static {
    /// Deliver a freshly generated password to its owner.
    ///
    /// # Errors
    /// * `DeliveryFailed` - The notification could not be sent
    async fn notify_password_reset(
        &self,
        user: &User,
        new_password: &str,
    ) -> Result<(), NotificationError>;
}
