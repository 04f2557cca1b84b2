// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-control groups.
//!
//! A group is the unit resources are shared with. Membership is stored on
//! the group record, so a user's group set is derived by scanning groups.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::storage::StorageResult;

/// Group stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredGroup {
    /// Unique group identifier
    pub id: String,
    /// Group name, unique across groups
    pub name: String,
    /// Users belonging to the group
    pub member_ids: BTreeSet<String>,
    /// Members allowed to manage the membership list
    pub admin_ids: BTreeSet<String>,
    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl StoredGroup {
    /// Whether the user belongs to this group.
    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_ids.contains(user_id)
    }

    /// Whether the user administers this group.
    pub fn has_admin(&self, user_id: &str) -> bool {
        self.admin_ids.contains(user_id)
    }
}

impl Record for StoredGroup {
    const COLLECTION: &'static str = "groups";
    const LABEL: &'static str = "Group";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for group records.
pub type GroupRepository<'a> = Repository<'a, StoredGroup>;

impl Repository<'_, StoredGroup> {
    /// Look a group up by name.
    pub fn find_by_name(&self, name: &str) -> StorageResult<Option<StoredGroup>> {
        Ok(self.list_all()?.into_iter().find(|group| group.name == name))
    }

    /// All groups a user belongs to. Fails on any unreadable group.
    pub fn list_for_member(&self, user_id: &str) -> StorageResult<Vec<StoredGroup>> {
        Ok(self
            .try_list_all()?
            .into_iter()
            .filter(|group| group.has_member(user_id))
            .collect())
    }

    /// IDs of all groups a user belongs to.
    pub fn ids_for_member(&self, user_id: &str) -> StorageResult<BTreeSet<String>> {
        Ok(self
            .list_for_member(user_id)?
            .into_iter()
            .map(|group| group.id)
            .collect())
    }

    /// The subset of `group_ids` that does not name an existing group.
    pub fn missing<'g>(&self, group_ids: impl IntoIterator<Item = &'g String>) -> Vec<String> {
        group_ids
            .into_iter()
            .filter(|id| !self.exists(id))
            .cloned()
            .collect()
    }
}
