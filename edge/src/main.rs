use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_edge::config::EdgeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_edge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EdgeConfig::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        dist_dir = %config.dist_dir.display(),
        cookie_name = %config.cookie_name,
        login_path = %config.login_path,
        landing_path = %config.landing_path,
        public_routes = ?config.public_routes,
        bypass_prefixes = ?config.bypass_prefixes,
        "Loaded configuration from environment/.env"
    );

    let app = admin_edge::app(&config);

    tracing::info!("Dashboard edge listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
