use std::net::SocketAddr;
use std::sync::Arc;
use twtxt_registry::api;
use twtxt_registry::config::Config;
use twtxt_registry::fetch::client::HttpFetcher;
use twtxt_registry::refresh::spawn_refresh_loop;
use twtxt_registry::registry::Index;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!("Starting registry on {}", config.bind);
    if config.seed_registries.is_empty() {
        tracing::info!("No seed registries, serving local registrations only");
    } else {
        tracing::info!("Seed registries: {:?}", config.seed_registries);
    }

    // 1. Index and its fetcher:
    let fetcher = Arc::new(HttpFetcher::with_timeout(config.fetch_timeout)?);
    let index = Arc::new(Index::new(fetcher));

    // 2. Refresh loop:
    spawn_refresh_loop(
        index.clone(),
        config.seed_registries.clone(),
        config.refresh_interval,
    );
    tracing::info!("Refreshing every {:?}", config.refresh_interval);

    // 3. HTTP server:
    let app = api::router(index);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
