//! Detour HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use detour::auth::{TrustStoreConfig, TrustStoreHandle};
use detour::{AlternativesCatalog, Config, Engine, EngineConfig, RiskModel, VectorIndex};
use detour_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
  ██████╗ ███████╗████████╗ ██████╗ ██╗   ██╗██████╗
  ██╔══██╗██╔════╝╚══██╔══╝██╔═══██╗██║   ██║██╔══██╗
  ██║  ██║█████╗     ██║   ██║   ██║██║   ██║██████╔╝
  ██║  ██║██╔══╝     ██║   ██║   ██║██║   ██║██╔══██╗
  ██████╔╝███████╗   ██║   ╚██████╔╝╚██████╔╝██║  ██║
  ╚═════╝ ╚══════╝   ╚═╝    ╚═════╝  ╚═════╝ ╚═╝  ╚═╝

        SCORE. COMPARE. SUBSTITUTE.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Detour starting"
    );

    // Startup loads everything the request path will ever touch; any
    // failure here aborts before the listener is bound, so the liveness
    // endpoint never reports a partially-initialized process.
    let model = Arc::new(RiskModel::load(&config.model_path)?);
    let catalog = Arc::new(AlternativesCatalog::load(&config.catalog_path)?);
    let index = Arc::new(VectorIndex::build(&catalog, config.metric)?);

    let refresh_interval = (config.trust_store_refresh_secs > 0)
        .then(|| Duration::from_secs(config.trust_store_refresh_secs));
    let trust_store = Arc::new(TrustStoreHandle::load(TrustStoreConfig {
        path: config.trust_store_path.clone(),
        refresh_interval,
    })?);

    let engine = Arc::new(Engine::new(
        model,
        catalog,
        index,
        EngineConfig::from_config(&config),
    )?);

    let state = HandlerState::new(
        engine,
        trust_store,
        Duration::from_millis(config.request_timeout_ms),
    );

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Detour shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("DETOUR_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
