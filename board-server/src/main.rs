use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_server::board::{BoardClient, FixtureBoardSource};
use board_server::config::AppConfig;
use board_server::domain::SystemClock;
use board_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let lines = config.load_lines()?;
    info!(lines = lines.len(), "loaded line colours");

    let clock = SystemClock::new(config.timezone);
    let state = match &config.fixture_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving boards from fixtures");
            AppState::new(FixtureBoardSource::new(dir), lines, clock)
        }
        None => {
            info!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "serving live boards");
            AppState::new(BoardClient::new(config.client_config())?, lines, clock)
        }
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Departure board server listening on http://{}", config.bind_addr);
    info!("  GET /departures?stopId=...  - Departures for a stop");
    info!("  GET /health                 - Health check");

    axum::serve(listener, app).await?;
    Ok(())
}
