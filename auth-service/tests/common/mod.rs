use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenIssuer;
use auth_service::domain::user::models::BootstrapAdminCommand;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::Username;
use auth_service::domain::user::ports::UserServicePort;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Passw0rd!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryUserRepository>,
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());

        // Lowest supported cost keeps the suite fast
        let authenticator = Arc::new(Authenticator::new(
            PasswordHasher::with_cost(PasswordHasher::MIN_COST).expect("Invalid hash cost"),
            TokenIssuer::new(JWT_SECRET, chrono::Duration::hours(24)),
        ));

        let user_service = Arc::new(UserService::new(Arc::clone(&repository), authenticator));

        let router = create_router(user_service.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            user_service,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register a user and return the parsed response body
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "confirmPassword": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a user and return the issued token
    pub async fn register_and_get_token(&self, username: &str) -> String {
        let response = self
            .register(username, &format!("{}@example.com", username), PASSWORD)
            .await;
        let body: Value = response.json().await.expect("Failed to parse response");

        body["data"]["token"]
            .as_str()
            .expect("Missing token in register response")
            .to_string()
    }

    /// Log in and return the raw response
    pub async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({
                "username": identifier,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create an administrator account and return its token
    pub async fn admin_token(&self, username: &str) -> String {
        self.user_service
            .bootstrap_admin(BootstrapAdminCommand {
                username: Username::new(username.to_string()).unwrap(),
                email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("Failed to bootstrap admin")
            .expect("Admin already existed");

        let body: Value = self
            .login(username, PASSWORD)
            .await
            .json()
            .await
            .expect("Failed to parse response");

        body["data"]["token"]
            .as_str()
            .expect("Missing token in login response")
            .to_string()
    }
}
