//! meterd: a usage metering service.
//!
//! Accepts usage events over HTTP, forwards them to a Kinesis Data Firehose
//! delivery stream, and answers aggregate billing queries by running SQL
//! against Athena over the ingested data.

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod models;
mod observability;
mod query;
mod routes;
mod services;
mod stream;

#[cfg(test)]
mod testing;

use config::MeterConfig;
use query::{AthenaEngine, QueryRunner};
use services::{IngestService, StatsService};
use stream::FirehoseStream;

/// Shared per-request state. Clients are constructed once at startup and
/// injected; there is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub stats: Arc<StatsService>,
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::about))
        .route("/health", get(routes::health_check))
        .route("/meter", post(routes::add_usage).get(routes::billing_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CLI arguments for meterd.
#[derive(Parser, Debug)]
#[command(version, about = "meterd usage metering service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to meterd.toml if it exists)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the metering server (default)
    Serve,
    /// Write a default configuration file
    Init {
        /// Path to create the config file
        #[arg(short, long, default_value = "meterd.toml")]
        output: String,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Default configuration for zero-config startup.
fn default_config_toml() -> &'static str {
    r#"# meterd configuration

[server]
host = "127.0.0.1"
port = 3333

[aws]
# region = "us-east-1"
# endpoint_url = "http://localhost:4566"  # localstack

[metering]
stream_name = "usage-events"
database = "default"
table = "usage_events"
output_location = "s3://meterd-query-output"
query_timeout_secs = 60
poll_interval_secs = 2
max_unknown_polls = 30

[observability.logging]
level = "info"
format = "pretty"
"#
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => run_init(&output, force),
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

fn run_init(output: &str, force: bool) {
    if Path::new(output).exists() && !force {
        eprintln!("Error: {output} already exists (use --force to overwrite)");
        std::process::exit(1);
    }
    if let Err(e) = std::fs::write(output, default_config_toml()) {
        eprintln!("Error: failed to write {output}: {e}");
        std::process::exit(1);
    }
    println!("Created configuration at: {output}");
}

/// Run the metering server.
async fn run_server(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);

    observability::init_tracing(&config.observability.logging);

    tracing::info!(
        stream = %config.metering.stream_name,
        database = %config.metering.database,
        table = %config.metering.table,
        "Starting metering service"
    );

    // One shared SDK config; per-service clients are built from it and
    // injected into the services.
    let sdk_config = config.aws.load_sdk_config().await;
    let endpoint_url = config.aws.endpoint_url.as_deref();

    let firehose = Arc::new(FirehoseStream::new(&sdk_config, endpoint_url));
    let athena = Arc::new(AthenaEngine::new(&sdk_config, endpoint_url));

    let runner = QueryRunner::new(athena)
        .with_poll_interval(config.metering.poll_interval())
        .with_max_unknown_polls(config.metering.max_unknown_polls);

    let ingest = Arc::new(IngestService::new(
        firehose,
        config.metering.stream_name.clone(),
    ));
    let stats = Arc::new(StatsService::new(
        runner,
        config.metering.database.clone(),
        config.metering.table.clone(),
        config.metering.output_location.clone(),
        config.metering.query_timeout(),
    ));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { ingest, stats };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

fn load_config(explicit_config_path: Option<&str>) -> MeterConfig {
    match explicit_config_path {
        Some(path) => match MeterConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {path}: {e}");
                std::process::exit(1);
            }
        },
        // Without --config, meterd.toml is optional: fall back to defaults.
        None if Path::new("meterd.toml").exists() => match MeterConfig::from_file("meterd.toml") {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from meterd.toml: {e}");
                std::process::exit(1);
            }
        },
        None => MeterConfig::default(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
