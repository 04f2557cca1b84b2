// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode};

use skyshare_server::{
    api::router,
    config::ServerConfig,
    init_tracing,
    seed::seed_from_file,
    state::{AppState, AuthConfig},
    storage::{FileStorage, StoragePaths},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = FileStorage::new(StoragePaths::new(&config.data_dir));
    storage.initialize()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Storage initialized");

    if let Some(seed_file) = &config.seed_file {
        let summary = seed_from_file(&storage, seed_file)?;
        tracing::info!(
            users = summary.users_created,
            groups = summary.groups_created,
            "Seed applied"
        );
    }

    let auth_config = AuthConfig::from_server_config(&config);
    if !auth_config.is_production() {
        tracing::warn!("AUTH_SECRET not set: token signatures are NOT verified (development mode)");
    }

    let state = AppState::new(storage).with_auth_config(auth_config);
    let addr: SocketAddr = config.bind_address().parse()?;

    tracing::info!(%addr, "SkyShare server listening (docs at /docs)");

    let server = axum_server::bind(addr).serve(router(state).into_make_service());
    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }
    Ok(())
}
