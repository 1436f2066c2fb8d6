use capstone_upload::config::AppConfig;
use capstone_upload::infrastructure::{database, plagiarism, storage};
use capstone_upload::services::file_repository::SeaOrmFileRepository;
use capstone_upload::services::file_service::FileService;
use capstone_upload::services::staging::StagingArea;
use capstone_upload::{AppState, create_app};
use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the API server (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Scratch directory for staged uploads (overrides UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capstone_upload=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.upload_dir {
        config.upload.dir = dir;
    }

    info!("🚀 Starting capstone upload service...");
    info!(
        "🛡️  Upload Config: Max Size={}MB, Scratch Dir={}, Plagiarism Threshold={}%",
        config.upload.max_upload_size_mb,
        config.upload.dir.display(),
        config.plagiarism.threshold
    );

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    // 2. Gateways
    let db = database::setup_database(&config.database).await?;
    let storage_service = storage::setup_storage(&config.storage).await?;
    let plagiarism_service = plagiarism::setup_plagiarism(&config.plagiarism, config.request_timeout())?;

    // 3. Application state
    let file_service = Arc::new(FileService::new(
        storage_service.clone(),
        Arc::new(SeaOrmFileRepository::new(db.clone())),
        plagiarism_service,
        StagingArea::new(config.upload.dir.clone()),
        &config.plagiarism,
    ));

    let port = config.server.port;
    let state = AppState {
        db,
        storage: storage_service,
        file_service,
        config,
    };

    // 4. Serve
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ API Server listening on: http://0.0.0.0:{}", port);
    info!("📖 Swagger UI documentation: http://localhost:{}/swagger-ui", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Backend exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }

    info!("🛑 Shutting down backend services...");
}
