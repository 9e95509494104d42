use std::sync::Arc;

use supersaas_connector_access::MemorySessionStore;
use supersaas_connector_server::{
    auth::{AppState, OidcIdentityClient, routes},
    config::ServerConfig,
    supersaas::SuperSaasClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let cookie_key = config
        .session
        .signing_key()
        .expect("invalid session secret");

    // Initialize OIDC client
    tracing::info!("Discovering OIDC provider...");
    let identity = OidcIdentityClient::discover(config.oidc.clone(), config.redirect_uri())
        .await
        .expect("failed to discover OIDC provider");

    // Configure SuperSaaS client
    let provisioning =
        SuperSaasClient::new(&config.supersaas).expect("invalid SuperSaaS configuration");

    // Create application state
    let app_state = Arc::new(AppState::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(identity),
        Arc::new(provisioning),
        config.error_redirect_url.clone(),
        cookie_key,
        config.session.secure_cookies,
    ));

    let app = routes::router(app_state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Completes on SIGINT or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }
}
