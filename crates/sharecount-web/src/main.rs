mod error;
mod logging;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use sharecount_core::{Collector, CollectorConfig, PlatformRegistry, ReqwestClientFactory};
use tracing::info;

/// Serves share counts over HTTP.
#[derive(Debug, Parser)]
#[command(name = "sharecount-web", author, version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    logging::init();
    let args = Args::parse();

    let collector = Collector::new(
        PlatformRegistry::default(),
        CollectorConfig::from_env(),
        Arc::new(ReqwestClientFactory),
    );
    let app = routes::router(collector);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("sharecount web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
