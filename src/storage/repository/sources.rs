// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Astronomical sources, the parents of comments, photometry and spectra.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::access::GroupScoped;
use crate::storage::StorageResult;

/// Source stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredSource {
    /// Source identifier (survey designation, e.g. `ZTF21aaqjmps`)
    pub id: String,
    /// Right ascension in degrees
    pub ra: Option<f64>,
    /// Declination in degrees
    pub dec: Option<f64>,
    /// Groups the source is visible to
    pub group_ids: BTreeSet<String>,
    /// User who saved the source
    pub created_by: String,
    /// When the source was saved
    pub created_at: DateTime<Utc>,
}

impl GroupScoped for StoredSource {
    fn group_ids(&self) -> &BTreeSet<String> {
        &self.group_ids
    }
}

impl Record for StoredSource {
    const COLLECTION: &'static str = "sources";
    const LABEL: &'static str = "Source";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for source records.
pub type SourceRepository<'a> = Repository<'a, StoredSource>;

impl Repository<'_, StoredSource> {
    /// Add groups to a source's visibility. Returns the groups newly added.
    pub fn extend_groups(
        &self,
        source_id: &str,
        group_ids: &BTreeSet<String>,
    ) -> StorageResult<BTreeSet<String>> {
        let mut source = self.get(source_id)?;
        let added: BTreeSet<String> = group_ids.difference(&source.group_ids).cloned().collect();
        if added.is_empty() {
            return Ok(added);
        }

        source.group_ids.extend(added.iter().cloned());
        self.update(&source)?;
        Ok(added)
    }
}
