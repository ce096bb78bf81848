use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tripplan::service::TripPlanDb;
use tripplan::storage::MemoryStore;
use tripplan::web::{AppState, app};
use tripplan::ServiceConfig;

#[derive(Debug, Parser)]
#[command(name = "tripplan", about = "Collaborative trip-planning backend")]
struct Args {
    /// Bind host; overrides TRIPPLAN_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port; overrides TRIPPLAN_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tripplan=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = ServiceConfig::from_env();
    if let Some(host) = args.host {
        config = config.host(&host);
    }
    if let Some(port) = args.port {
        config = config.port(port);
    }

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(TripPlanDb::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "tripplan listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
