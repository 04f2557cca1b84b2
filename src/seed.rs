// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup bootstrap of users and groups.
//!
//! Tokens are issued elsewhere, so a fresh data directory needs at least one
//! registered system admin before anyone can call the API. `SEED_FILE` points
//! to a document like:
//!
//! ```json
//! {
//!   "users": [{"id": "admin", "username": "admin", "role": "super_admin"}],
//!   "groups": [{"id": "sitewide", "name": "Sitewide Group", "member_ids": ["admin"]}]
//! }
//! ```
//!
//! Records whose id already exists are left untouched, so reseeding is safe.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;

use crate::auth::{Acl, Role};
use crate::storage::{
    FileStorage, GroupRepository, StorageError, StoredGroup, StoredUser, UserRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub groups: Vec<SeedGroup>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub acls: Option<BTreeSet<Acl>>,
}

#[derive(Debug, Deserialize)]
pub struct SeedGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub member_ids: BTreeSet<String>,
    #[serde(default)]
    pub admin_ids: BTreeSet<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users_created: usize,
    pub groups_created: usize,
}

pub fn seed_from_file(storage: &FileStorage, path: &Path) -> Result<SeedSummary, SeedError> {
    let content = std::fs::read(path)?;
    let seed: SeedFile = serde_json::from_slice(&content)?;
    apply_seed(storage, &seed)
}

pub fn apply_seed(storage: &FileStorage, seed: &SeedFile) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();
    let now = Utc::now();

    let users = UserRepository::new(storage);
    for user in &seed.users {
        if users.exists(&user.id) {
            continue;
        }
        // explicit ACLs win over a role preset
        let acls = match (&user.acls, user.role) {
            (Some(acls), _) => acls.clone(),
            (None, Some(role)) => role.acls(),
            (None, None) => Role::default().acls(),
        };
        users.create(&StoredUser {
            id: user.id.clone(),
            username: user.username.clone(),
            acls,
            created_at: now,
        })?;
        summary.users_created += 1;
    }

    let groups = GroupRepository::new(storage);
    for group in &seed.groups {
        if groups.exists(&group.id) {
            continue;
        }
        let mut member_ids = group.member_ids.clone();
        // group admins are always members
        member_ids.extend(group.admin_ids.iter().cloned());
        groups.create(&StoredGroup {
            id: group.id.clone(),
            name: group.name.clone(),
            member_ids,
            admin_ids: group.admin_ids.clone(),
            created_at: now,
        })?;
        summary.groups_created += 1;
    }

    tracing::info!(
        users_created = summary.users_created,
        groups_created = summary.groups_created,
        "Seed applied"
    );
    Ok(summary)
}
