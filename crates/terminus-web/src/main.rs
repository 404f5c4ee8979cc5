//! terminus-web - serves host facts over HTTP.
//!
//! Every request to `/` triggers a fresh collection; nothing is cached
//! between requests.

mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{any, get};
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

use terminus_core::Collector;
#[cfg(not(target_os = "linux"))]
use terminus_core::collector::{MockFs, MockHost};
#[cfg(target_os = "linux")]
use terminus_core::collector::{RealFs, RealHost};
use terminus_core::config::{Config, DEFAULT_EXTERNAL_FACTS_DIR};

use state::AppState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "terminus-web", about = "terminus HTTP facts server", version = terminus_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8080", env = "TERMINUS_LISTEN")]
    listen: String,

    /// Directory scanned for external fact providers.
    #[arg(long, env = "TERMINUS_EXTERNAL_FACTS_DIR", default_value = DEFAULT_EXTERNAL_FACTS_DIR)]
    external_facts_dir: PathBuf,

    /// Query the EC2 instance metadata endpoint. Disable with --cloud=false.
    #[arg(long, env = "TERMINUS_CLOUD", default_value_t = true, action = clap::ArgAction::Set)]
    cloud: bool,
}

// ============================================================
// Router
// ============================================================

fn server_header() -> HeaderValue {
    HeaderValue::from_str(&format!("Terminus {}", terminus_core::VERSION))
        .unwrap_or_else(|_| HeaderValue::from_static("Terminus"))
}

pub(crate) fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::handle_facts))
        .route("/health", get(handlers::handle_health))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            server_header(),
        ))
        .layer(CompressionLayer::new())
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terminus_web=info,terminus_core=info".into()),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };
    runtime.block_on(async_main(args));
}

async fn async_main(args: Args) {
    let config = Config::default()
        .with_external_facts_dir(&args.external_facts_dir)
        .with_cloud(args.cloud);
    info!(
        version = terminus_core::VERSION,
        external_facts_dir = %config.external_facts_dir.display(),
        cloud = config.cloud.enabled,
        "starting"
    );

    #[cfg(target_os = "linux")]
    let collector = Collector::new(RealFs::new(), RealHost::new(), config);
    #[cfg(not(target_os = "linux"))]
    let collector = {
        warn!("not running on linux, serving mock facts");
        Collector::new(MockFs::typical_system(), MockHost::typical_system(), config)
    };

    let app = app(AppState::new(collector));

    let addr: SocketAddr = match args.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(listen = %args.listen, error = %e, "invalid listen address");
            process::exit(1);
        }
    };
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    info!(%addr, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }
    info!("stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
