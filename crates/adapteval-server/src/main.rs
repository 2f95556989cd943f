use adapteval_core::config as app_config;
use adapteval_core::session::Engine;
use adapteval_core::storage::build_store;
use adapteval_server::config::ServerConfig;
use adapteval_server::methods::MethodContext;
use adapteval_server::server::Server;
use adapteval_server::sessions::SessionRegistry;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "adapteval.yaml")]
    config: PathBuf,
}

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr) // stdout is the transport
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = ServerConfig::from_env();

    init_logging(&cfg.log_level);

    let app_cfg = app_config::load_config(&args.config).map_err(|e| anyhow::anyhow!(e))?;
    let store = build_store(&app_cfg)?;
    let engine = Engine::from_config(&app_cfg, store);
    let registry = SessionRegistry::new(
        cfg.session_capacity,
        Duration::from_secs(cfg.session_idle_secs),
    );

    tracing::info!(
        event = "server_start",
        config = ?args.config,
        backend = %app_cfg.store.backend,
        baseline = %app_cfg.responses.baseline,
    );

    let ctx = MethodContext {
        engine,
        registry,
        auth: app_cfg.auth.clone(),
    };
    Server::run(ctx, cfg).await
}
