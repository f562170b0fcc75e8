use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store used when no database is configured.
///
/// Uniqueness checks and writes happen under the same write lock, so two
/// concurrent saves cannot both claim a username or email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the `enabled` flag of the user with this username.
    ///
    /// # Returns
    /// Whether a matching user was found
    pub async fn set_enabled(&self, username: &str, enabled: bool) -> bool {
        let mut users = self.users.write().await;

        match users.values_mut().find(|user| user.username.matches(username)) {
            Some(user) => {
                user.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;

        let by_username = users
            .values()
            .find(|user| user.username.matches(identifier));
        let found = by_username.or_else(|| users.values().find(|user| user.email.matches(identifier)));

        Ok(found.cloned())
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .any(|user| user.username.matches(username.as_str())))
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        let users = self.users.read().await;

        Ok(users.values().any(|user| user.email.matches(email.as_str())))
    }

    async fn save(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        for other in users.values().filter(|other| other.id != user.id) {
            if other.username.matches(user.username.as_str()) {
                return Err(UserError::UsernameAlreadyExists(
                    user.username.as_str().to_string(),
                ));
            }
            if other.email.matches(user.email.as_str()) {
                return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
            }
        }

        users.insert(user.id, user.clone());

        Ok(user)
    }
}
