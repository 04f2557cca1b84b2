// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::storage::FileStorage;

/// Token verification settings.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// HS256 secret; `None` selects development mode
    pub secret: Option<String>,
    /// Expected `iss` claim
    pub issuer: Option<String>,
}

impl AuthConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            secret: config.auth_secret.clone(),
            issuer: config.auth_issuer.clone(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.secret.is_some()
    }
}

/// Shared application state.
///
/// Handlers take the read lock to query and the write lock for any mutation,
/// so multi-record changes are never observed half-applied.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<RwLock<FileStorage>>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
            auth_config: AuthConfig::default(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }
}
