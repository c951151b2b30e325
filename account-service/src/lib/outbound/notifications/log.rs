use async_trait::async_trait;

use crate::domain::user::models::User;
use crate::domain::user::ports::CredentialNotifier;
use crate::user::errors::NotificationError;

/// Notifier that records resets in the service log.
///
/// Stands in for a mail transport; the password itself is never written.
#[derive(Debug, Default, Clone)]
pub struct LogCredentialNotifier;

impl LogCredentialNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialNotifier for LogCredentialNotifier {
    async fn notify_password_reset(
        &self,
        user: &User,
        new_password: &str,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            password_length = new_password.len(),
            "Password reset pending delivery"
        );
        Ok(())
    }
}
