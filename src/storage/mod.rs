// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage as plain files under a data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/{user_id}.json
//!   groups/{group_id}.json
//!   sources/{source_id}.json
//!   comments/{comment_id}.json
//!   attachments/{comment_id}.bin   # raw attachment bytes
//!   photometry/{photometry_id}.json
//!   spectra/{spectrum_id}.json
//!   audit/
//!     {date}/events.jsonl          # daily audit logs
//! ```
//!
//! Record identifiers double as file stems and are validated with
//! [`paths::is_valid_id`] before touching the filesystem.

pub mod audit;
pub mod file_store;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use file_store::{FileStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    CommentRepository, GroupRepository, MagSys, PhotometryRepository, Record, Repository,
    SourceRepository, SpectrumRepository, StoredComment, StoredGroup, StoredPhotometry,
    StoredSource, StoredSpectrum, StoredUser, UserRepository,
};
