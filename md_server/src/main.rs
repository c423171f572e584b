//! Math duel relay server.
//!
//! Pairs WebSocket clients into two-player sessions and referees their card
//! battles. All state is in memory.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::{error, info};
use math_duel::{Catalog, Lobby};
use md_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use pico_args::Arguments;

const HELP: &str = "\
Run the math duel matchmaking and session server

USAGE:
  md_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3001]
  --metrics-bind  IP:PORT  Prometheus exporter address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                   Server bind address (e.g., 0.0.0.0:3001)
  METRICS_BIND                  Prometheus exporter address
  TURN_DELAY_MS                 Pause between a play and the turn change [2000]
  STARTING_HAND_SIZE            Cards dealt to each participant [5]
  MAX_RESOURCE                  Resource ceiling for heal and drain [100]
  GRACE_TURNS                   Turns survived at zero resource [3]
  CARD_COPIES                   Copies of each catalog card per deck [4]
  DISCONNECT_TEARDOWN_MS        Session teardown delay after a disconnect [0]
  FINISHED_SESSION_LINGER_SECS  How long finished sessions stay registered [30]
  RUST_LOG                      Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    metrics_bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.metrics_bind)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{addr}/metrics");
    }

    let lobby = Arc::new(Lobby::new(config.session.clone(), Arc::new(Catalog::default())));
    let app = api::create_router(AppState::new(Arc::clone(&lobby)));

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    lobby.shutdown().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
