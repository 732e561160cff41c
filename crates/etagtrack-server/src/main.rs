use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use etagtrack_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("etagtrack=info".parse()?)
                .add_directive("etagtrack_server=info".parse()?),
        )
        .json()
        .init();

    let cfg = etagtrack_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // The secret is what keeps outsiders from recomputing identifiers from
    // observed address + user-agent. Running with the shipped placeholder is
    // fine for a local demo, nothing more.
    if cfg.secret_is_default() {
        tracing::warn!(
            "ETAGTRACK_SECRET not set — using the built-in placeholder secret. \
             First-contact identifiers are recomputable by anyone with the source."
        );
    }

    if !std::path::Path::new(&cfg.static_dir).exists() {
        tracing::warn!(
            static_dir = %cfg.static_dir,
            "Static directory not found. /etags.jpg will 404 and the tracking \
             image falls back to an embedded 1x1 pixel."
        );
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let port = cfg.port;
    let state = Arc::new(AppState::new(cfg)?);
    let app = etagtrack_server::app::build_app(state);

    info!(port, "etagtrack listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    Ok(())
}
