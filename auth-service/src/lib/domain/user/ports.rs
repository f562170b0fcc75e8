use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::BootstrapAdminCommand;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for authentication workflow operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated username and email plus the password and its confirmation
    ///
    /// # Returns
    /// Session with token and created user
    ///
    /// # Errors
    /// * `PasswordMismatch` - Password and confirmation differ
    /// * `InsecurePassword` - Password fails the password policy
    /// * `UsernameAlreadyExists` - Username is already taken (case-insensitive)
    /// * `EmailAlreadyExists` - Email is already registered (case-insensitive)
    /// * `StorageUnavailable` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, UserError>;

    /// Authenticate with a username or email and a password.
    ///
    /// # Returns
    /// Session with token and authenticated user
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password
    /// * `AccountDisabled` - Password is correct but the account is disabled
    /// * `StorageUnavailable` - Store operation failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError>;

    /// Replace the password of `username` after verifying the old one.
    ///
    /// # Errors
    /// * `InsecurePassword` - New password fails the password policy
    /// * `InvalidCredentials` - Old password does not verify
    /// * `NotFoundByUsername` - Account no longer exists
    /// * `StorageUnavailable` - Store operation failed
    async fn change_password(
        &self,
        username: &Username,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `StorageUnavailable` - Store operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;

    /// Resolve a bearer token to the enabled account it was issued for.
    ///
    /// # Returns
    /// `None` when the token is malformed or expired, or when its subject is
    /// unknown or disabled
    ///
    /// # Errors
    /// * `StorageUnavailable` - Store operation failed
    async fn resolve_token(&self, token: &str) -> Result<Option<User>, UserError>;

    /// Whether `password` satisfies the password policy.
    fn is_password_secure(&self, password: &str) -> bool;

    /// Create the administrator account unless the username is taken.
    ///
    /// # Returns
    /// Created user, or `None` when an account with that username already exists
    ///
    /// # Errors
    /// * `InsecurePassword` - Password fails the password policy
    /// * `EmailAlreadyExists` - Email belongs to another account
    /// * `StorageUnavailable` - Store operation failed
    async fn bootstrap_admin(&self, command: BootstrapAdminCommand)
        -> Result<Option<User>, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user whose username or email equals `identifier`, ignoring case.
    ///
    /// A username match wins over an email match.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `StorageUnavailable` - Store operation failed
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, UserError>;

    /// Whether a user with this username exists, ignoring case.
    ///
    /// # Errors
    /// * `StorageUnavailable` - Store operation failed
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;

    /// Whether a user with this email exists, ignoring case.
    ///
    /// # Errors
    /// * `StorageUnavailable` - Store operation failed
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Insert a new user or overwrite the stored user with the same id.
    ///
    /// # Returns
    /// Saved user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Another user holds this username
    /// * `EmailAlreadyExists` - Another user holds this email
    /// * `StorageUnavailable` - Store operation failed
    async fn save(&self, user: User) -> Result<User, UserError>;
}
