// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Group-Scoped Visibility Gate
//!
//! Every comment, photometry point and spectrum has an owner and a set of
//! groups. Decisions are made for an [`AuthenticatedUser`]:
//!
//! | Decision | Allowed when |
//! |----------|--------------|
//! | view     | actor shares a group with the resource, or is a system admin |
//! | modify   | actor owns the resource, or is a system admin |
//! | share    | actor owns the resource, or is a system admin, and targets are non-empty |
//!
//! Ownership alone does not grant visibility. An owner who is removed from
//! every group of their resource stops seeing it.

mod gate;

use std::collections::BTreeSet;

use crate::auth::Acl;

pub use gate::{
    can_modify, can_share, can_view, ensure_modify, ensure_share, ensure_view, require_acl,
};

/// A record that belongs to the user who created it.
pub trait OwnedResource {
    /// Human-readable kind used in error messages ("comment", "photometry").
    const KIND: &'static str;

    fn resource_id(&self) -> &str;

    fn owner_user_id(&self) -> &str;
}

/// A record whose visibility is controlled by a group set.
pub trait GroupScoped {
    fn group_ids(&self) -> &BTreeSet<String>;
}

/// Reasons an access decision was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Actor shares no group with the resource
    #[error("Insufficient permissions.")]
    InsufficientPermissions,

    /// Actor lacks an ACL the operation requires
    #[error("Insufficient permissions: the '{0}' ACL is required")]
    MissingAcl(Acl),

    /// Actor is neither the owner nor a system admin
    #[error("Only the owner of {kind} {id} or a system administrator can {action} it")]
    NotOwner {
        kind: &'static str,
        id: String,
        action: &'static str,
    },

    /// A share named no target groups
    #[error("At least one target group is required")]
    NoTargetGroups,
}
