use std::sync::Arc;

use async_trait::async_trait;
use auth::random;
use auth::scope;
use auth::Authenticator;
use auth::PasswordHasher;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::models::TokenPair;
use crate::domain::user::models::UpdatePasswordCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::user::errors::UnauthorizedReason;
use crate::user::errors::UserError;
use crate::user::policy::AccountPolicy;
use crate::user::ports::CredentialNotifier;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for account and token operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Every read-then-write sequence makes its write conditional on the `jti`
/// or `salt` it read, so concurrent callers cannot silently overwrite each
/// other.
pub struct UserService<UR, CN>
where
    UR: UserRepository,
    CN: CredentialNotifier,
{
    repository: Arc<UR>,
    notifier: Arc<CN>,
    authenticator: Arc<Authenticator>,
    password_hasher: PasswordHasher,
    policy: AccountPolicy,
}

impl<UR, CN> UserService<UR, CN>
where
    UR: UserRepository,
    CN: CredentialNotifier,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `notifier` - Delivery of generated passwords
    /// * `authenticator` - Token signing and verification
    /// * `password_hasher` - Credential hasher
    /// * `policy` - Active-user filtering and token rotation rules
    pub fn new(
        repository: Arc<UR>,
        notifier: Arc<CN>,
        authenticator: Arc<Authenticator>,
        password_hasher: PasswordHasher,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            repository,
            notifier,
            authenticator,
            password_hasher,
            policy,
        }
    }

    fn id_filter(&self, id: &UserId, only_active: bool) -> UserFilter {
        UserFilter::by_id(*id).active_only(only_active)
    }

    /// Replace salt and hash, provided the salt is still the one we read.
    async fn replace_credentials(&self, user: &User, new_password: &str) -> Result<(), UserError> {
        let salt = random::generate_salt();
        let password_hash = self.password_hasher.hash(new_password, &salt)?;

        let rows = self
            .repository
            .update(
                &UserFilter::by_id(user.id).with_salt(user.salt.as_str()),
                &UserChanges::credentials(password_hash, salt),
            )
            .await?;

        if rows == 0 {
            return Err(UserError::ConcurrentModification(user.id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<UR, CN> UserServicePort for UserService<UR, CN>
where
    UR: UserRepository,
    CN: CredentialNotifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<Registration, UserError> {
        let salt = random::generate_salt();
        let password_hash = self
            .password_hasher
            .hash(command.password.as_str(), &salt)?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                display_name: command.display_name,
                password_hash,
                salt,
                jti: random::generate_rotation_id(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered user");

        if !command.return_token {
            return Ok(Registration { user, tokens: None });
        }

        let refresh_token = self
            .issue_refresh_token(LoginCommand {
                email: user.email.clone(),
                password: command.password.as_str().to_string(),
            })
            .await?;
        let claims = self.authenticator.verify(&refresh_token)?;
        let access_token = self.issue_access_token(&claims).await?;

        Ok(Registration {
            user,
            tokens: Some(TokenPair {
                refresh_token,
                access_token,
            }),
        })
    }

    async fn issue_refresh_token(&self, command: LoginCommand) -> Result<String, UserError> {
        let filter = UserFilter::by_email(command.email).active_only(self.policy.active_filter.login);
        let user = self
            .repository
            .find_one(&filter)
            .await?
            .ok_or(UserError::Unauthorized(UnauthorizedReason::UserNotFound))?;

        if !self
            .password_hasher
            .verify(&command.password, &user.salt, &user.password_hash)?
        {
            return Err(UserError::Unauthorized(
                UnauthorizedReason::IncorrectPassword,
            ));
        }

        let jti = random::generate_rotation_id();
        let rows = self
            .repository
            .update(
                &UserFilter::by_id(user.id).with_jti(user.jti.as_str()),
                &UserChanges::rotate_jti(jti.as_str()),
            )
            .await?;

        if rows != 1 {
            tracing::error!(user_id = %user.id, rows, "Refresh token rotation touched unexpected rows");
            return Err(UserError::RowCountMismatch {
                expected: 1,
                actual: rows,
            });
        }

        let mut granted = vec![scope::REFRESH.to_string()];
        if user.admin {
            granted.push(scope::ADMIN.to_string());
        }

        let token = self.authenticator.sign_refresh(user.id, &jti, granted)?;
        tracing::info!(user_id = %user.id, "Issued refresh token");

        Ok(token)
    }

    async fn issue_access_token(&self, claims: &auth::Claims) -> Result<String, UserError> {
        let subject = claims
            .sub
            .as_deref()
            .ok_or_else(|| UserError::InvalidToken("missing subject".to_string()))?;
        let id = UserId::from_string(subject).map_err(|e| UserError::InvalidToken(e.to_string()))?;

        if self.policy.enforce_refresh_rotation || self.policy.active_filter.exchange {
            let user = self
                .repository
                .find_one(&self.id_filter(&id, self.policy.active_filter.exchange))
                .await?
                .ok_or_else(|| UserError::InvalidToken(format!("unknown subject {}", id)))?;

            if self.policy.enforce_refresh_rotation && claims.jti.as_deref() != Some(user.jti.as_str())
            {
                tracing::warn!(user_id = %id, "Refresh token was rotated out");
                return Err(UserError::InvalidToken("refresh token revoked".to_string()));
            }
        }

        let mut granted = vec![scope::user_scope(id)];
        if claims.has_scope(scope::ADMIN) {
            granted.push(scope::ADMIN.to_string());
        }

        let token = self.authenticator.sign_access(id, granted)?;
        tracing::info!(user_id = %id, "Issued access token");

        Ok(token)
    }

    async fn revoke(&self, id: &UserId) -> Result<u64, UserError> {
        let user = self
            .repository
            .find_one(&self.id_filter(id, self.policy.active_filter.revoke))
            .await?
            .ok_or(UserError::Unauthorized(UnauthorizedReason::UserNotFound))?;

        let rows = self
            .repository
            .update(
                &UserFilter::by_id(user.id).with_jti(user.jti.as_str()),
                &UserChanges::rotate_jti(random::generate_rotation_id()),
            )
            .await?;

        if rows == 0 {
            return Err(UserError::ConcurrentModification(id.to_string()));
        }

        tracing::info!(user_id = %id, "Revoked refresh tokens");
        Ok(rows)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_one(&self.id_filter(id, self.policy.active_filter.read))
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<(), UserError> {
        let rows = self
            .repository
            .update(
                &self.id_filter(id, self.policy.active_filter.update),
                &command.into(),
            )
            .await
            .map_err(|e| match e {
                // Only registration reports duplicates to the caller.
                UserError::AlreadyExists { .. } => UserError::DatabaseError(e.to_string()),
                other => other,
            })?;

        if rows == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_password(
        &self,
        id: &UserId,
        command: UpdatePasswordCommand,
    ) -> Result<(), UserError> {
        let user = self
            .repository
            .find_one(&self.id_filter(id, self.policy.active_filter.update_password))
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if !self
            .password_hasher
            .verify(&command.password, &user.salt, &user.password_hash)?
        {
            return Err(UserError::PasswordIncorrect);
        }

        self.replace_credentials(&user, command.new_password.as_str())
            .await?;

        tracing::info!(user_id = %id, "Password updated");
        Ok(())
    }

    async fn reset_password(&self, id: &UserId) -> Result<(), UserError> {
        let user = self
            .repository
            .find_one(&self.id_filter(id, self.policy.active_filter.reset_password))
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        let new_password = random::generate_password(self.policy.reset_password_length);
        self.replace_credentials(&user, &new_password).await?;

        tracing::info!(user_id = %id, "Password reset");

        if let Err(e) = self
            .notifier
            .notify_password_reset(&user, &new_password)
            .await
        {
            tracing::error!("Failed to deliver reset password for user {}: {}", id, e);
        }

        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        let rows = self
            .repository
            .delete(&self.id_filter(id, self.policy.active_filter.delete))
            .await?;

        if rows == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::Username;
    use crate::user::errors::NotificationError;
    use crate::user::errors::UniqueField;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, UserError>;
            async fn update(&self, filter: &UserFilter, changes: &UserChanges) -> Result<u64, UserError>;
            async fn delete(&self, filter: &UserFilter) -> Result<u64, UserError>;
        }
    }

    mock! {
        pub TestCredentialNotifier {}

        #[async_trait]
        impl CredentialNotifier for TestCredentialNotifier {
            async fn notify_password_reset(&self, user: &User, new_password: &str) -> Result<(), NotificationError>;
        }
    }

    const SECRET: &str = "test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(&auth::TokenConfig::new(SECRET, "accounts")))
    }

    fn service(
        repository: MockTestUserRepository,
        notifier: MockTestCredentialNotifier,
    ) -> UserService<MockTestUserRepository, MockTestCredentialNotifier> {
        UserService::new(
            Arc::new(repository),
            Arc::new(notifier),
            authenticator(),
            PasswordHasher::default(),
            AccountPolicy::default(),
        )
    }

    fn stored_user(password: &str) -> User {
        let salt = "stored-salt".to_string();
        User {
            id: UserId(7),
            username: Username::new("test".to_string()).unwrap(),
            email: EmailAddress::new("t@x.com".to_string()).unwrap(),
            display_name: None,
            password_hash: PasswordHasher::default().hash(password, &salt).unwrap(),
            salt,
            jti: "stored-jti".to_string(),
            active: true,
            admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn from_new_user(new_user: NewUser) -> User {
        User {
            id: UserId(7),
            username: new_user.username,
            email: new_user.email,
            display_name: new_user.display_name,
            password_hash: new_user.password_hash,
            salt: new_user.salt,
            jti: new_user.jti,
            active: true,
            admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn register_command(return_token: bool) -> RegisterCommand {
        RegisterCommand {
            username: Username::new("test".to_string()).unwrap(),
            email: EmailAddress::new("t@x.com".to_string()).unwrap(),
            password: Password::new("123456".to_string()).unwrap(),
            display_name: None,
            return_token,
        }
    }

    fn login(password: &str) -> LoginCommand {
        LoginCommand {
            email: EmailAddress::new("t@x.com".to_string()).unwrap(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_without_tokens() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "test"
                    && PasswordHasher::default()
                        .verify("123456", &user.salt, &user.password_hash)
                        .unwrap()
            })
            .times(1)
            .returning(|user| Ok(from_new_user(user)));
        repository.expect_find_one().times(0);

        let service = service(repository, MockTestCredentialNotifier::new());

        let registration = service.register(register_command(false)).await.unwrap();

        assert_eq!(registration.user.username.as_str(), "test");
        assert!(registration.tokens.is_none());
    }

    #[tokio::test]
    async fn test_register_returns_token_pair() {
        let mut repository = MockTestUserRepository::new();
        let stored = Arc::new(Mutex::new(None::<User>));

        let created = stored.clone();
        repository.expect_create().times(1).returning(move |user| {
            let user = from_new_user(user);
            *created.lock().unwrap() = Some(user.clone());
            Ok(user)
        });

        let found = stored.clone();
        repository
            .expect_find_one()
            .returning(move |_| Ok(found.lock().unwrap().clone()));

        let updated = stored.clone();
        repository.expect_update().times(1).returning(move |filter, changes| {
            let mut guard = updated.lock().unwrap();
            match guard.as_mut() {
                Some(user) if filter.matches(user) => {
                    changes.apply_to(user);
                    Ok(1)
                }
                _ => Ok(0),
            }
        });

        let service = service(repository, MockTestCredentialNotifier::new());

        let registration = service.register(register_command(true)).await.unwrap();
        let tokens = registration.tokens.expect("tokens requested");

        let authenticator = authenticator();
        let refresh = authenticator.verify(&tokens.refresh_token).unwrap();
        let access = authenticator.verify(&tokens.access_token).unwrap();

        assert!(refresh.has_scope(scope::REFRESH));
        assert_eq!(refresh.jti.as_deref(), stored.lock().unwrap().as_ref().map(|u| u.jti.as_str()));
        assert!(access.has_scope("user-7"));
        assert!(!access.has_scope(scope::ADMIN));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::AlreadyExists {
                field: UniqueField::Email,
                value: user.email.as_str().to_string(),
            })
        });

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.register(register_command(true)).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::AlreadyExists {
                field: UniqueField::Email,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_login_rotates_jti_conditionally() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .withf(|filter| filter.email.is_some() && filter.active == Some(true))
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository
            .expect_update()
            .withf(|filter, changes| {
                filter.id == Some(UserId(7))
                    && filter.jti.as_deref() == Some("stored-jti")
                    && changes.jti.is_some()
                    && changes.password_hash.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service(repository, MockTestCredentialNotifier::new());

        let token = service.issue_refresh_token(login("123456")).await.unwrap();
        let claims = authenticator().verify(&token).unwrap();

        assert_eq!(claims.sub.as_deref(), Some("7"));
        assert_eq!(claims.scope, vec![scope::REFRESH.to_string()]);
        assert_ne!(claims.jti.as_deref(), Some("stored-jti"));
    }

    #[tokio::test]
    async fn test_login_grants_admin_scope() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_find_one().times(1).returning(|_| {
            let mut user = stored_user("123456");
            user.admin = true;
            Ok(Some(user))
        });
        repository.expect_update().times(1).returning(|_, _| Ok(1));

        let service = service(repository, MockTestCredentialNotifier::new());

        let token = service.issue_refresh_token(login("123456")).await.unwrap();
        let claims = authenticator().verify(&token).unwrap();

        assert!(claims.has_scope(scope::REFRESH));
        assert!(claims.has_scope(scope::ADMIN));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_find_one().times(1).returning(|_| Ok(None));
        repository.expect_update().times(0);

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.issue_refresh_token(login("123456")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::Unauthorized(UnauthorizedReason::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository.expect_update().times(0);

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.issue_refresh_token(login("654321")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::Unauthorized(UnauthorizedReason::IncorrectPassword)
        ));
    }

    #[tokio::test]
    async fn test_login_row_count_mismatch() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository.expect_update().times(1).returning(|_, _| Ok(0));

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.issue_refresh_token(login("123456")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::RowCountMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_exchange_with_current_jti() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .withf(|filter| filter.id == Some(UserId(7)) && filter.active.is_none())
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));

        let service = service(repository, MockTestCredentialNotifier::new());

        let claims = auth::Claims::refresh(
            7,
            "stored-jti",
            vec![scope::REFRESH.to_string(), scope::ADMIN.to_string()],
        );
        let token = service.issue_access_token(&claims).await.unwrap();
        let access = authenticator().verify(&token).unwrap();

        assert_eq!(access.scope, vec!["user-7".to_string(), scope::ADMIN.to_string()]);
        assert!(access.exp.is_some());
        assert!(access.jti.is_none());
    }

    #[tokio::test]
    async fn test_exchange_rejects_rotated_jti() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));

        let service = service(repository, MockTestCredentialNotifier::new());

        let claims = auth::Claims::refresh(7, "old-jti", vec![scope::REFRESH.to_string()]);
        let result = service.issue_access_token(&claims).await;

        assert!(matches!(result.unwrap_err(), UserError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_exchange_without_rotation_check_skips_store() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_one().times(0);

        let service = UserService::new(
            Arc::new(repository),
            Arc::new(MockTestCredentialNotifier::new()),
            authenticator(),
            PasswordHasher::default(),
            AccountPolicy {
                enforce_refresh_rotation: false,
                ..AccountPolicy::default()
            },
        );

        let claims = auth::Claims::refresh(7, "any-jti", vec![scope::REFRESH.to_string()]);
        assert!(service.issue_access_token(&claims).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_rotates_jti() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .withf(|filter| filter.active.is_none())
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository
            .expect_update()
            .withf(|filter, changes| {
                filter.jti.as_deref() == Some("stored-jti")
                    && changes.jti.as_deref().is_some_and(|jti| jti != "stored-jti")
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service(repository, MockTestCredentialNotifier::new());

        assert_eq!(service.revoke(&UserId(7)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_revoke_unknown_user() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_find_one().times(1).returning(|_| Ok(None));

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.revoke(&UserId(99)).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::Unauthorized(UnauthorizedReason::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .withf(|filter| filter.active == Some(true))
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.get_user(&UserId(99)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_update().times(1).returning(|_, _| Ok(0));

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service
            .update_user(&UserId(99), UpdateUserCommand::default())
            .await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_user_duplicate_is_server_side() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_update().times(1).returning(|_, changes| {
            Err(UserError::AlreadyExists {
                field: UniqueField::Username,
                value: changes
                    .username
                    .as_ref()
                    .map(|u| u.as_str().to_string())
                    .unwrap_or_default(),
            })
        });

        let service = service(repository, MockTestCredentialNotifier::new());

        let command = UpdateUserCommand {
            username: Some(Username::new("taken".to_string()).unwrap()),
            ..UpdateUserCommand::default()
        };
        let result = service.update_user(&UserId(7), command).await;

        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_update_password_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository
            .expect_update()
            .withf(|filter, changes| {
                let (Some(hash), Some(salt)) = (&changes.password_hash, &changes.salt) else {
                    return false;
                };
                filter.salt.as_deref() == Some("stored-salt")
                    && salt != "stored-salt"
                    && changes.jti.is_none()
                    && PasswordHasher::default()
                        .verify("abcdef", salt, hash)
                        .unwrap()
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service(repository, MockTestCredentialNotifier::new());

        let command = UpdatePasswordCommand {
            password: "123456".to_string(),
            new_password: Password::new("abcdef".to_string()).unwrap(),
        };
        assert!(service.update_password(&UserId(7), command).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_password_incorrect() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository.expect_update().times(0);

        let service = service(repository, MockTestCredentialNotifier::new());

        let command = UpdatePasswordCommand {
            password: "wrong-password".to_string(),
            new_password: Password::new("abcdef".to_string()).unwrap(),
        };
        let result = service.update_password(&UserId(7), command).await;

        assert!(matches!(result.unwrap_err(), UserError::PasswordIncorrect));
    }

    #[tokio::test]
    async fn test_update_password_concurrent_modification() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository.expect_update().times(1).returning(|_, _| Ok(0));

        let service = service(repository, MockTestCredentialNotifier::new());

        let command = UpdatePasswordCommand {
            password: "123456".to_string(),
            new_password: Password::new("abcdef".to_string()).unwrap(),
        };
        let result = service.update_password(&UserId(7), command).await;

        assert!(matches!(
            result.unwrap_err(),
            UserError::ConcurrentModification(_)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_notifies_generated_password() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestCredentialNotifier::new();
        let written = Arc::new(Mutex::new(None::<(String, String)>));

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));

        let captured = written.clone();
        repository
            .expect_update()
            .withf(|filter, _| filter.salt.as_deref() == Some("stored-salt"))
            .times(1)
            .returning(move |_, changes| {
                *captured.lock().unwrap() = changes
                    .password_hash
                    .clone()
                    .zip(changes.salt.clone());
                Ok(1)
            });

        let delivered = written.clone();
        notifier
            .expect_notify_password_reset()
            .withf(move |user, password| {
                let guard = delivered.lock().unwrap();
                let Some((hash, salt)) = guard.as_ref() else {
                    return false;
                };
                user.id == UserId(7)
                    && password.len() == 32
                    && PasswordHasher::default()
                        .verify(password, salt, hash)
                        .unwrap()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, notifier);

        assert!(service.reset_password(&UserId(7)).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_survives_notification_failure() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestCredentialNotifier::new();

        repository
            .expect_find_one()
            .times(1)
            .returning(|_| Ok(Some(stored_user("123456"))));
        repository.expect_update().times(1).returning(|_, _| Ok(1));
        notifier
            .expect_notify_password_reset()
            .times(1)
            .returning(|_, _| Err(NotificationError::DeliveryFailed("smtp down".to_string())));

        let service = service(repository, notifier);

        assert!(service.reset_password(&UserId(7)).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_not_found() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestCredentialNotifier::new();

        repository.expect_find_one().times(1).returning(|_| Ok(None));
        notifier.expect_notify_password_reset().times(0);

        let service = service(repository, notifier);

        let result = service.reset_password(&UserId(99)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_delete()
            .withf(|filter| filter.id == Some(UserId(7)) && filter.active.is_none())
            .times(1)
            .returning(|_| Ok(1));

        let service = service(repository, MockTestCredentialNotifier::new());

        assert!(service.delete_user(&UserId(7)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_delete().times(1).returning(|_| Ok(0));

        let service = service(repository, MockTestCredentialNotifier::new());

        let result = service.delete_user(&UserId(99)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }
}
