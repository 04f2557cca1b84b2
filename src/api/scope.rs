// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lookups shared by the resource endpoints.

use std::collections::BTreeSet;

use crate::{
    access::ensure_view,
    auth::AuthenticatedUser,
    error::ApiError,
    storage::{FileStorage, GroupRepository, SourceRepository, StorageError, StorageResult, StoredSource},
};

/// Map a missing record to a client-facing message; other faults pass through.
pub(crate) fn found<T>(result: StorageResult<T>, message: &str) -> Result<T, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found(message)),
        Err(e) => Err(e.into()),
    }
}

/// Load a source the actor is allowed to see.
pub(crate) fn visible_source(
    storage: &FileStorage,
    actor: &AuthenticatedUser,
    source_id: &str,
) -> Result<StoredSource, ApiError> {
    let source = found(SourceRepository::new(storage).get(source_id), "Invalid source ID")?;
    ensure_view(actor, &source)?;
    Ok(source)
}

/// Group set for a record being created.
///
/// Omitted groups default to the actor's own. Given groups must be
/// non-empty and must all exist.
pub(crate) fn initial_groups(
    storage: &FileStorage,
    actor: &AuthenticatedUser,
    requested: Option<Vec<String>>,
) -> Result<BTreeSet<String>, ApiError> {
    match requested {
        Some(group_ids) => existing_groups(storage, group_ids),
        None if actor.group_ids.is_empty() => Err(ApiError::validation(
            "No group_ids given and the requesting user belongs to no groups",
        )),
        None => Ok(actor.group_ids.clone()),
    }
}

/// Validate an explicit group list.
pub(crate) fn existing_groups(
    storage: &FileStorage,
    group_ids: Vec<String>,
) -> Result<BTreeSet<String>, ApiError> {
    let group_ids: BTreeSet<String> = group_ids.into_iter().collect();
    if group_ids.is_empty() {
        return Err(ApiError::validation("group_ids must not be empty"));
    }

    let missing = GroupRepository::new(storage).missing(&group_ids);
    if !missing.is_empty() {
        return Err(ApiError::validation(format!(
            "Invalid group IDs: {}",
            missing.join(", ")
        )));
    }
    Ok(group_ids)
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<(), ApiError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ApiError::validation(format!("{field} must be a finite number")))
    }
}
