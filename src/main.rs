use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use url::Url;

use fabric_sync::admin::{admin_router, AdminState};
use fabric_sync::config::{load_settings, Settings, TopologyMode};
use fabric_sync::lifecycle::Shutdown;
use fabric_sync::observability::{logging, metrics};
use fabric_sync::provider::{ConfigProvider, SyncOptions};
use fabric_sync::topology::rest::RestTopologyClient;
use fabric_sync::topology::TopologyClient;

/// Keep a reverse proxy's routes and clusters in sync with cluster topology.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML settings file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    logging::init_logging(&settings.observability.log_level);
    tracing::info!(
        base_uri = %settings.topology.base_uri,
        fanout = settings.topology.fanout,
        "fabric-sync starting"
    );

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(error) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                %error,
                "failed to parse metrics address"
            ),
        }
    }

    let client: Arc<dyn TopologyClient> = match settings.topology.mode {
        TopologyMode::Rest => {
            let base = Url::parse(&settings.topology.base_uri)?;
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(settings.topology.request_timeout_secs))
                .build()?;
            Arc::new(RestTopologyClient::with_client(
                http,
                base,
                settings.topology.api_version.clone(),
            ))
        }
        TopologyMode::Native => {
            return Err(
                "the native binding needs a driver wired by the embedding host; \
                 construct NativeTopologyClient through the library API"
                    .into(),
            );
        }
    };

    let provider = Arc::new(ConfigProvider::new(
        client,
        SyncOptions {
            fanout: settings.topology.fanout_limit(),
        },
    ));

    let state = AdminState {
        provider,
        api_key: settings.admin.api_key.clone(),
    };

    let shutdown = Shutdown::new();
    let stop = shutdown.triggered();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
        }
        shutdown.trigger();
    });

    let listener = TcpListener::bind(&settings.admin.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "admin endpoints listening");

    axum::serve(listener, admin_router(state))
        .with_graceful_shutdown(stop)
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}
