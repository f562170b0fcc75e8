use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::BootstrapAdminCommand;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::password_policy;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for the authentication workflow.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Argon2 work runs on the blocking pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool, UserError> {
        if password.is_empty() {
            return Ok(false);
        }

        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.verify_password(&password, &stored_hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(UserError::from)
    }

    /// Verify `password` against the stored hash and sign a token for `user`.
    async fn authenticate(&self, user: &User, password: String) -> Result<String, UserError> {
        if password.is_empty() {
            return Err(UserError::InvalidCredentials);
        }

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let subject = user.username.as_str().to_string();
        let extra_claims = session_claims(user);

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &subject, extra_claims)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Authentication task failed: {}", e)))??;

        Ok(result.access_token)
    }

    fn open_session(&self, user: User) -> Result<AuthSession, UserError> {
        let token = self
            .authenticator
            .issue_token(user.username.as_str(), session_claims(&user))?;

        Ok(AuthSession { token, user })
    }
}

fn session_claims(user: &User) -> HashMap<String, serde_json::Value> {
    let mut extra_claims = HashMap::new();
    extra_claims.insert(
        "role".to_string(),
        serde_json::Value::String(user.role.as_str().to_string()),
    );
    extra_claims
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, UserError> {
        if command.password != command.confirm_password {
            return Err(UserError::PasswordMismatch);
        }

        if !password_policy::is_password_secure(&command.password) {
            return Err(UserError::InsecurePassword);
        }

        if self.repository.exists_by_username(&command.username).await? {
            return Err(UserError::UsernameAlreadyExists(
                command.username.as_str().to_string(),
            ));
        }

        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;
        let user = User::new(command.username, command.email, password_hash, Role::User);

        let saved_user = self.repository.save(user).await?;
        tracing::info!(
            user_id = %saved_user.id,
            username = %saved_user.username,
            "User registered"
        );

        self.open_session(saved_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError> {
        let Some(user) = self
            .repository
            .find_by_identifier(&command.identifier)
            .await?
        else {
            tracing::warn!(identifier = %command.identifier, "Login for unknown account");
            return Err(UserError::InvalidCredentials);
        };

        let token = match self.authenticate(&user, command.password).await {
            Ok(token) => token,
            Err(UserError::InvalidCredentials) => {
                tracing::warn!(user_id = %user.id, "Login with wrong password");
                return Err(UserError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !user.enabled {
            tracing::warn!(user_id = %user.id, "Login to disabled account");
            return Err(UserError::AccountDisabled);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(AuthSession { token, user })
    }

    async fn change_password(
        &self,
        username: &Username,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        if !password_policy::is_password_secure(&command.new_password) {
            return Err(UserError::InsecurePassword);
        }

        let mut user = self.get_user_by_username(username).await?;

        let is_valid = self
            .verify_password(command.old_password, user.password_hash.clone())
            .await?;

        if !is_valid {
            tracing::warn!(user_id = %user.id, "Password change with wrong current password");
            return Err(UserError::InvalidCredentials);
        }

        let password_hash = self.hash_password(command.new_password).await?;
        user.set_password_hash(password_hash);

        let saved_user = self.repository.save(user).await?;
        tracing::info!(user_id = %saved_user.id, "Password changed");

        Ok(())
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_identifier(username.as_str())
            .await?
            .filter(|user| user.username.matches(username.as_str()))
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<User>, UserError> {
        let subject = match self.authenticator.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected");
                return Ok(None);
            }
        };

        let Some(user) = self.repository.find_by_identifier(&subject).await? else {
            tracing::debug!(subject = %subject, "Bearer token subject not found");
            return Ok(None);
        };

        if !self.authenticator.is_token_valid(token, user.username.as_str()) {
            tracing::debug!(subject = %subject, "Bearer token does not belong to resolved user");
            return Ok(None);
        }

        if !user.enabled {
            tracing::debug!(user_id = %user.id, "Bearer token for disabled account");
            return Ok(None);
        }

        Ok(Some(user))
    }

    fn is_password_secure(&self, password: &str) -> bool {
        password_policy::is_password_secure(password)
    }

    async fn bootstrap_admin(
        &self,
        command: BootstrapAdminCommand,
    ) -> Result<Option<User>, UserError> {
        if self.repository.exists_by_username(&command.username).await? {
            tracing::info!(username = %command.username, "Admin account already present");
            return Ok(None);
        }

        if !password_policy::is_password_secure(&command.password) {
            return Err(UserError::InsecurePassword);
        }

        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;
        let user = User::new(command.username, command.email, password_hash, Role::Admin);

        let saved_user = self.repository.save(user).await?;
        tracing::info!(
            user_id = %saved_user.id,
            username = %saved_user.username,
            "Admin account created"
        );

        Ok(Some(saved_user))
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use auth::TokenIssuer;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, UserError>;
            async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
            async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
            async fn save(&self, user: User) -> Result<User, UserError>;
        }
    }

    const PASSWORD: &str = "Passw0rd!";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            PasswordHasher::with_cost(4).unwrap(),
            TokenIssuer::new(
                b"test-secret-key-for-jwt-signing-at-least-32-bytes",
                Duration::hours(24),
            ),
        ))
    }

    fn service(repository: MockTestUserRepository) -> UserService<MockTestUserRepository> {
        UserService::new(Arc::new(repository), authenticator())
    }

    fn stored_user(username: &str, password: &str, role: Role, enabled: bool) -> User {
        let hash = PasswordHasher::with_cost(4).unwrap().hash(password).unwrap();
        let mut user = User::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            hash,
            role,
        );
        user.enabled = enabled;
        user
    }

    fn register_command(password: &str, confirm: &str) -> RegisterCommand {
        RegisterCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            password.to_string(),
            confirm.to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_save()
            .withf(|user| {
                user.username.as_str() == "alice"
                    && user.email.as_str() == "alice@example.com"
                    && user.role == Role::User
                    && user.enabled
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository);

        let session = service
            .register(register_command(PASSWORD, PASSWORD))
            .await
            .unwrap();

        assert_eq!(session.user.username.as_str(), "alice");
        assert_ne!(session.user.password_hash, PASSWORD);

        let claims = service.authenticator.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(claims.extra_str("role"), Some("USER"));
    }

    #[tokio::test]
    async fn test_register_password_mismatch_fails_before_store() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_exists_by_username().times(0);
        repository.expect_exists_by_email().times(0);
        repository.expect_save().times(0);

        let result = service(repository)
            .register(register_command(PASSWORD, "Passw0rd?"))
            .await;

        assert!(matches!(result, Err(UserError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_register_insecure_password() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_exists_by_username().times(0);
        repository.expect_save().times(0);

        let result = service(repository)
            .register(register_command("password", "password"))
            .await;

        assert!(matches!(result, Err(UserError::InsecurePassword)));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_exists_by_email().times(0);
        repository.expect_save().times(0);

        let result = service(repository)
            .register(register_command(PASSWORD, PASSWORD))
            .await;

        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_save().times(0);

        let result = service(repository)
            .register(register_command(PASSWORD, PASSWORD))
            .await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_store_unavailable() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Err(UserError::StorageUnavailable("connection refused".to_string())));

        let result = service(repository)
            .register(register_command(PASSWORD, PASSWORD))
            .await;

        assert!(matches!(result, Err(UserError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_login_success_by_username_or_email() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, true);

        repository
            .expect_find_by_identifier()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);

        for identifier in ["alice", "alice@example.com"] {
            let session = service
                .login(LoginCommand {
                    identifier: identifier.to_string(),
                    password: PASSWORD.to_string(),
                })
                .await
                .unwrap();

            assert_eq!(session.user.username.as_str(), "alice");
            assert_eq!(service.authenticator.extract_subject(&session.token).unwrap(), "alice");
        }
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_are_indistinguishable() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, true);

        repository
            .expect_find_by_identifier()
            .withf(|identifier| identifier == "alice")
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_find_by_identifier()
            .withf(|identifier| identifier == "nobody")
            .returning(|_| Ok(None));

        let service = service(repository);

        let wrong_password = service
            .login(LoginCommand {
                identifier: "alice".to_string(),
                password: "Wr0ng_password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_user = service
            .login(LoginCommand {
                identifier: "nobody".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, UserError::InvalidCredentials));
        assert!(matches!(unknown_user, UserError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_token_carries_role_claim() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("root", PASSWORD, Role::Admin, true);

        repository
            .expect_find_by_identifier()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);

        let session = service
            .login(LoginCommand {
                identifier: "root".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let claims = service.authenticator.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("root"));
        assert_eq!(claims.extra_str("role"), Some("ADMIN"));
    }

    #[tokio::test]
    async fn test_login_against_corrupt_stored_hash_is_invalid_credentials() {
        let mut repository = MockTestUserRepository::new();
        let mut user = stored_user("alice", PASSWORD, Role::User, true);
        user.password_hash = "not-a-phc-string".to_string();

        repository
            .expect_find_by_identifier()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(repository)
            .login(LoginCommand {
                identifier: "alice".to_string(),
                password: PASSWORD.to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, false);

        repository
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);

        let correct = service
            .login(LoginCommand {
                identifier: "alice".to_string(),
                password: PASSWORD.to_string(),
            })
            .await;
        let wrong = service
            .login(LoginCommand {
                identifier: "alice".to_string(),
                password: "Wr0ng_password".to_string(),
            })
            .await;

        assert!(matches!(correct, Err(UserError::AccountDisabled)));
        assert!(matches!(wrong, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, true);
        let old_hash = user.password_hash.clone();
        let old_updated_at = user.updated_at;

        repository
            .expect_find_by_identifier()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_save()
            .withf(move |user| {
                user.password_hash != old_hash
                    && user.password_hash.starts_with("$argon2id$")
                    && user.updated_at >= old_updated_at
            })
            .times(1)
            .returning(|user| Ok(user));

        let result = service(repository)
            .change_password(
                &Username::new("alice".to_string()).unwrap(),
                ChangePasswordCommand {
                    old_password: PASSWORD.to_string(),
                    new_password: "N3w_password".to_string(),
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, true);

        repository
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_save().times(0);

        let result = service(repository)
            .change_password(
                &Username::new("alice".to_string()).unwrap(),
                ChangePasswordCommand {
                    old_password: "Wr0ng_password".to_string(),
                    new_password: "N3w_password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_insecure_new_password() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_find_by_identifier().times(0);
        repository.expect_save().times(0);

        let result = service(repository)
            .change_password(
                &Username::new("alice".to_string()).unwrap(),
                ChangePasswordCommand {
                    old_password: PASSWORD.to_string(),
                    new_password: "weak".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::InsecurePassword)));
    }

    #[tokio::test]
    async fn test_get_user_by_username_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository)
            .get_user_by_username(&Username::new("nonexistent".to_string()).unwrap())
            .await;

        assert!(matches!(result, Err(UserError::NotFoundByUsername(_))));
    }

    #[tokio::test]
    async fn test_resolve_token() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("alice", PASSWORD, Role::User, true);
        let user_id = user.id;

        repository
            .expect_find_by_identifier()
            .withf(|identifier| identifier == "alice")
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository);
        let token = service
            .authenticator
            .issue_token("alice", HashMap::new())
            .unwrap();

        let resolved = service.resolve_token(&token).await.unwrap();
        assert_eq!(resolved.map(|user| user.id), Some(user_id));

        assert!(service.resolve_token("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_token_unknown_or_disabled_user() {
        let mut repository = MockTestUserRepository::new();
        let disabled = stored_user("bob", PASSWORD, Role::User, false);

        repository
            .expect_find_by_identifier()
            .withf(|identifier| identifier == "bob")
            .returning(move |_| Ok(Some(disabled.clone())));
        repository
            .expect_find_by_identifier()
            .withf(|identifier| identifier == "ghost")
            .returning(|_| Ok(None));

        let service = service(repository);

        let bob = service.authenticator.issue_token("bob", HashMap::new()).unwrap();
        let ghost = service.authenticator.issue_token("ghost", HashMap::new()).unwrap();

        assert!(service.resolve_token(&bob).await.unwrap().is_none());
        assert!(service.resolve_token(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_token_propagates_storage_failure() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_identifier()
            .returning(|_| Err(UserError::StorageUnavailable("timeout".to_string())));

        let service = service(repository);
        let token = service.authenticator.issue_token("alice", HashMap::new()).unwrap();

        assert!(matches!(
            service.resolve_token(&token).await,
            Err(UserError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_creates_account_once() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_save()
            .withf(|user| user.role == Role::Admin && user.enabled)
            .times(1)
            .returning(|user| Ok(user));

        let created = service(repository)
            .bootstrap_admin(BootstrapAdminCommand {
                username: Username::new("admin".to_string()).unwrap(),
                email: EmailAddress::new("admin@example.com".to_string()).unwrap(),
                password: "Adm1n_password".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.map(|user| user.role), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_skips_existing_username() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_save().times(0);

        let created = service(repository)
            .bootstrap_admin(BootstrapAdminCommand {
                username: Username::new("admin".to_string()).unwrap(),
                email: EmailAddress::new("admin@example.com".to_string()).unwrap(),
                password: "Adm1n_password".to_string(),
            })
            .await
            .unwrap();

        assert!(created.is_none());
    }
}
