//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! vigil-server — thin entry point for the Axum HTTP service.
//!
//! All routing logic lives in `vigil_platform::create_router`. This binary is
//! responsible only for: CLI parsing, env config loading, AppState wiring,
//! server binding, and graceful shutdown.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use vigil_core::{
    Config as CoreConfig, FileLedgerAdapter, LedgerAdapter, LedgerMode, LocalObjectStore,
    MockClassifier, PeerNmkStore, RemoteLedgerAdapter, TaCore, TriageClassifier,
};
use vigil_platform::{create_router, AppState, HttpConfig};

/// vigil-server — boots the vigil trusted-authority HTTP service.
#[derive(Parser)]
#[command(
    name = "vigil-server",
    version = env!("CARGO_PKG_VERSION"),
    about = "vigil trusted authority — threshold-custody record service"
)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = Cli::parse();
    tracing_subscriber::fmt::init();

    let core_config = CoreConfig::from_env();
    let http_config = HttpConfig::from_env()?;

    tracing::info!("vigil-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Port: {}", http_config.port);
    tracing::info!("Peers: {}", core_config.peer_ids.join(","));

    std::fs::create_dir_all(core_config.object_store_dir())?;
    std::fs::create_dir_all(core_config.peer_store_dir())?;

    let ledger: Arc<dyn LedgerAdapter> = match &core_config.ledger_mode {
        LedgerMode::Mock => {
            tracing::info!("Ledger backing: file-backed mock fabric");
            Arc::new(FileLedgerAdapter::open(core_config.ledger_path())?)
        }
        LedgerMode::Fabric {
            base_url,
            verify_tls,
        } => {
            tracing::info!(base_url, verify_tls, "Ledger backing: remote fabric REST");
            Arc::new(RemoteLedgerAdapter::new(base_url.clone(), *verify_tls)?)
        }
    };

    let object_store = LocalObjectStore::new(core_config.object_store_dir());
    let peer_store = PeerNmkStore::open(core_config.peer_store_dir(), &core_config.peer_ids)?;
    let classifier: Arc<dyn TriageClassifier> = Arc::new(MockClassifier::from_env_or_medium());

    let core = Arc::new(TaCore::new(
        ledger,
        object_store,
        peer_store,
        classifier,
        core_config.peer_ids.clone(),
    ));

    let state = AppState {
        core,
        jwt_secret: Arc::new(http_config.jwt_secret.clone()),
    };

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", http_config.port)).await?;
    tracing::info!("Listening on 0.0.0.0:{}", http_config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down cleanly");

    Ok(())
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
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
