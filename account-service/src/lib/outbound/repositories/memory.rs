use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UniqueField;
use crate::user::errors::UserError;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<User>,
}

impl Table {
    /// First unique column of `candidate` already held by another row.
    fn conflict(&self, candidate: &User) -> Option<UniqueField> {
        let others = self.rows.iter().filter(|row| row.id != candidate.id);
        for row in others {
            if row.username == candidate.username {
                return Some(UniqueField::Username);
            }
            if row.email == candidate.email {
                return Some(UniqueField::Email);
            }
        }
        None
    }
}

fn already_exists(field: UniqueField, user: &User) -> UserError {
    let value = match field {
        UniqueField::Username => user.username.as_str(),
        UniqueField::Email => user.email.as_str(),
    };
    UserError::AlreadyExists {
        field,
        value: value.to_string(),
    }
}

/// Process-local user store with the same unique-constraint behaviour as the
/// Postgres adapter. Used by tests and local runs without a database.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or withdraw admin rights. Administrators are provisioned out of
    /// band, so this has no counterpart on the repository port.
    pub async fn set_admin(&self, id: UserId, admin: bool) -> bool {
        self.modify(id, |user| user.admin = admin).await
    }

    /// Soft-delete or reactivate a user.
    pub async fn set_active(&self, id: UserId, active: bool) -> bool {
        self.modify(id, |user| user.active = active).await
    }

    async fn modify(&self, id: UserId, f: impl FnOnce(&mut User)) -> bool {
        let mut table = self.table.write().await;
        match table.rows.iter_mut().find(|row| row.id == id) {
            Some(user) => {
                f(user);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut table = self.table.write().await;

        let now = Utc::now();
        let user = User {
            id: UserId(table.next_id + 1),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            salt: user.salt,
            jti: user.jti,
            active: true,
            admin: false,
            created_at: now,
            updated_at: now,
        };

        if let Some(field) = table.conflict(&user) {
            return Err(already_exists(field, &user));
        }

        table.next_id += 1;
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, UserError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|row| filter.matches(row)).cloned())
    }

    async fn update(
        &self,
        filter: &UserFilter,
        changes: &UserChanges,
    ) -> Result<u64, UserError> {
        let mut table = self.table.write().await;

        let mut staged = Vec::new();
        for (index, row) in table.rows.iter().enumerate() {
            if filter.matches(row) {
                let mut updated = row.clone();
                changes.apply_to(&mut updated);
                updated.updated_at = Utc::now();
                staged.push((index, updated));
            }
        }

        // Validate every staged row before applying any, like a single statement.
        for (_, updated) in &staged {
            if let Some(field) = table.conflict(updated) {
                return Err(already_exists(field, updated));
            }
        }

        let rows = staged.len() as u64;
        for (index, updated) in staged {
            table.rows[index] = updated;
        }
        Ok(rows)
    }

    async fn delete(&self, filter: &UserFilter) -> Result<u64, UserError> {
        let mut table = self.table.write().await;

        match table.rows.iter().position(|row| filter.matches(row)) {
            Some(index) => {
                table.rows.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
