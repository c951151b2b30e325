use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UniqueField;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, username, email, display_name, password_hash, salt, jti, \
                            active, admin, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    display_name: Option<String>,
    password_hash: String,
    salt: String,
    jti: String,
    active: bool,
    admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = UserError;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            username: Username::new(r.username)?,
            email: EmailAddress::new(r.email)?,
            display_name: r.display_name.map(DisplayName::new).transpose()?,
            password_hash: r.password_hash,
            salt: r.salt,
            jti: r.jti,
            active: r.active,
            admin: r.admin,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append `WHERE` conditions for every constraint set on the filter.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder.push(" WHERE TRUE");
    if let Some(id) = filter.id {
        builder.push(" AND id = ").push_bind(id.0);
    }
    if let Some(email) = &filter.email {
        builder
            .push(" AND email = ")
            .push_bind(email.as_str().to_string());
    }
    if let Some(active) = filter.active {
        builder.push(" AND active = ").push_bind(active);
    }
    if let Some(salt) = &filter.salt {
        builder.push(" AND salt = ").push_bind(salt.clone());
    }
    if let Some(jti) = &filter.jti {
        builder.push(" AND jti = ").push_bind(jti.clone());
    }
}

fn select_query(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filter(&mut builder, filter);
    builder.push(" LIMIT 1");
    builder
}

fn update_query(filter: &UserFilter, changes: &UserChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
    if let Some(username) = &changes.username {
        builder
            .push(", username = ")
            .push_bind(username.as_str().to_string());
    }
    if let Some(email) = &changes.email {
        builder
            .push(", email = ")
            .push_bind(email.as_str().to_string());
    }
    if let Some(display_name) = &changes.display_name {
        builder
            .push(", display_name = ")
            .push_bind(display_name.as_str().to_string());
    }
    if let Some(password_hash) = &changes.password_hash {
        builder
            .push(", password_hash = ")
            .push_bind(password_hash.clone());
    }
    if let Some(salt) = &changes.salt {
        builder.push(", salt = ").push_bind(salt.clone());
    }
    if let Some(jti) = &changes.jti {
        builder.push(", jti = ").push_bind(jti.clone());
    }
    push_filter(&mut builder, filter);
    builder
}

/// Postgres has no `DELETE ... LIMIT`, so the single row is picked in a
/// subquery.
fn delete_query(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("DELETE FROM users WHERE id IN (SELECT id FROM users");
    push_filter(&mut builder, filter);
    builder.push(" LIMIT 1)");
    builder
}

/// Translate a store error, naming the unique column that was violated.
fn map_write_error(e: sqlx::Error, username: Option<&str>, email: Option<&str>) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return UserError::AlreadyExists {
                    field: UniqueField::Username,
                    value: username.unwrap_or_default().to_string(),
                };
            }
            if db_err.constraint() == Some("users_email_key") {
                return UserError::AlreadyExists {
                    field: UniqueField::Email,
                    value: email.unwrap_or_default().to_string(),
                };
            }
        }
    }
    tracing::error!("User store write failed: {}", e);
    UserError::DatabaseError(e.to_string())
}

fn map_read_error(e: sqlx::Error) -> UserError {
    tracing::error!("User store read failed: {}", e);
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, display_name, password_hash, salt, jti)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.display_name.as_ref().map(DisplayName::as_str))
            .bind(&user.password_hash)
            .bind(&user.salt)
            .bind(&user.jti)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, Some(user.username.as_str()), Some(user.email.as_str()))
            })?;

        record.try_into()
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, UserError> {
        let record = select_query(filter)
            .build_query_as::<UserRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)?;

        record.map(User::try_from).transpose()
    }

    async fn update(
        &self,
        filter: &UserFilter,
        changes: &UserChanges,
    ) -> Result<u64, UserError> {
        let result = update_query(filter, changes)
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    changes.username.as_ref().map(Username::as_str),
                    changes.email.as_ref().map(EmailAddress::as_str),
                )
            })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, filter: &UserFilter) -> Result<u64, UserError> {
        let result = delete_query(filter)
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None, None))?;

        Ok(result.rows_affected())
    }
}
