// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Comment repository.
//!
//! Comment metadata is a JSON record under `comments/`; an attachment, when
//! present, is kept as raw bytes under `attachments/{comment_id}.bin` and
//! only its name is stored on the record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::access::{GroupScoped, OwnedResource};
use crate::storage::{StorageError, StorageResult};

/// Comment stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredComment {
    /// Unique comment identifier (UUID)
    pub id: String,
    /// Source the comment is attached to
    pub obj_id: String,
    /// Comment body
    pub text: String,
    /// User who wrote the comment
    pub author_id: String,
    /// Groups the comment is visible to
    pub group_ids: BTreeSet<String>,
    /// File name of the attachment, if any
    pub attachment_name: Option<String>,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
    /// When the comment was last modified
    pub modified_at: DateTime<Utc>,
}

impl OwnedResource for StoredComment {
    const KIND: &'static str = "comment";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn owner_user_id(&self) -> &str {
        &self.author_id
    }
}

impl GroupScoped for StoredComment {
    fn group_ids(&self) -> &BTreeSet<String> {
        &self.group_ids
    }
}

impl Record for StoredComment {
    const COLLECTION: &'static str = "comments";
    const LABEL: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for comment records and their attachments.
pub type CommentRepository<'a> = Repository<'a, StoredComment>;

impl Repository<'_, StoredComment> {
    /// All comments attached to a source, oldest first.
    pub fn list_by_obj(&self, obj_id: &str) -> StorageResult<Vec<StoredComment>> {
        let mut comments = self.list_where(|comment| comment.obj_id == obj_id)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    /// Store the raw attachment bytes for a comment.
    pub fn write_attachment(&self, comment_id: &str, data: &[u8]) -> StorageResult<()> {
        let storage = self.storage();
        storage.write_raw(storage.paths().attachment(comment_id), data)
    }

    /// Read the raw attachment bytes for a comment.
    pub fn read_attachment(&self, comment_id: &str) -> StorageResult<Vec<u8>> {
        let storage = self.storage();
        storage.read_raw(storage.paths().attachment(comment_id))
    }

    /// Delete a comment together with its attachment.
    pub fn delete_with_attachment(&self, comment_id: &str) -> StorageResult<()> {
        self.delete(comment_id)?;

        let storage = self.storage();
        match storage.delete(storage.paths().attachment(comment_id)) {
            Ok(()) | Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
