use rusty_library_loans::{
    adapters::{
        http::{HttpInventoryClient, HttpUserDirectory},
        jwt::JwtTokenVerifier,
        postgres::PostgresLoanStore,
        redis::RedisNotificationPublisher,
    },
    api::{handlers::AppState, router::create_router},
    application::loan::{NotificationDispatcher, ServiceDependencies},
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rusty_library_loans=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.uses_json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let timeouts = config.timeouts();
    let http = reqwest::Client::builder()
        .timeout(timeouts.inventory.max(timeouts.directory))
        .build()
        .expect("Failed to build HTTP client");

    // Initialize adapters
    let token_verifier = Arc::new(JwtTokenVerifier::new(&config.auth.jwt_secret));
    let inventory = Arc::new(HttpInventoryClient::new(
        http.clone(),
        config.inventory.base_url.clone(),
    ));
    let loan_store = Arc::new(PostgresLoanStore::new(pool.clone()));
    let directory = Arc::new(HttpUserDirectory::new(
        http,
        config.directory.base_url.clone(),
        config.directory.service_username.clone(),
        config.directory.service_password.clone(),
    ));
    let publisher = Arc::new(
        RedisNotificationPublisher::new(
            &config.notification.redis_url,
            config.notification.routing_key.clone(),
        )
        .expect("Invalid Redis URL"),
    );

    let (notifications, notification_worker) = NotificationDispatcher::spawn(
        publisher,
        directory,
        timeouts,
        config.notification.queue_capacity,
    );

    // Create service dependencies
    let service_deps = ServiceDependencies {
        token_verifier,
        inventory,
        loan_store,
        notifications,
        timeouts,
    };

    let app = create_router(Arc::new(AppState { service_deps }));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // ルーターが破棄され送信側がなくなると、ワーカーは残りの通知を配信して終了する
    if let Err(e) = notification_worker.await {
        tracing::error!(error = %e, "Notification worker panicked");
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
