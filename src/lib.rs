// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SkyShare - Group-Scoped Astronomical Data Sharing Service
//!
//! Comments, photometry and spectra are attached to astronomical sources and
//! visible only to members of the groups they are shared with.
//!
//! ## Modules
//!
//! - `access` - Group-scoped view, modify and share gates
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token authentication and ACLs
//! - `storage` - File-backed repositories and audit log

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;

use tracing_subscriber::EnvFilter;

use config::{LogFormat, DEFAULT_LOG_FILTER};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
