// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registered users and their ACLs.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::auth::Acl;
use crate::storage::StorageResult;

/// User stored on disk. Group memberships live on the groups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (the token `sub` claim)
    pub id: String,
    /// Display name, unique across users
    pub username: String,
    /// Granted ACLs
    pub acls: BTreeSet<Acl>,
    /// When the user was registered
    pub created_at: DateTime<Utc>,
}

impl Record for StoredUser {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for user records.
pub type UserRepository<'a> = Repository<'a, StoredUser>;

impl Repository<'_, StoredUser> {
    /// Look a user up by username.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|user| user.username == username))
    }
}
