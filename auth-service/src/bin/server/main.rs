use std::sync::Arc;

use auth_service::config::AdminConfig;
use auth_service::config::Config;
use auth_service::domain::user::models::BootstrapAdminCommand;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::Username;
use auth_service::domain::user::ports::UserServicePort;
use auth_service::domain::user::service::UserService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryUserRepository;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = if config.database.url.is_some() { "postgresql" } else { "in-memory" },
        jwt_expiration_hours = config.jwt.expiration_hours,
        password_cost = config.password.cost,
        admin_bootstrap = config.admin.is_some(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(config.authenticator()?);

    let user_service: Arc<dyn UserServicePort> = match &config.database.url {
        Some(database_url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            Arc::new(UserService::new(user_repository, authenticator))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(user_repository, authenticator))
        }
    };

    if let Some(admin) = &config.admin {
        bootstrap_admin(user_service.as_ref(), admin).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service);

    match axum::serve(http_listener, http_application).await {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(())
}

async fn bootstrap_admin(
    user_service: &dyn UserServicePort,
    admin: &AdminConfig,
) -> Result<(), anyhow::Error> {
    let command = BootstrapAdminCommand {
        username: Username::new(admin.username.clone())?,
        email: EmailAddress::new(admin.email.clone())?,
        password: admin.password.clone(),
    };

    if let Some(user) = user_service.bootstrap_admin(command).await? {
        tracing::info!(user_id = %user.id, username = %user.username, "Admin account bootstrapped");
    }

    Ok(())
}
