// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control lists and role presets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single capability granted to a user.
///
/// `SystemAdmin` implies every other ACL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Acl {
    /// May post comments
    #[serde(rename = "Comment")]
    Comment,
    /// May post sources, photometry and spectra
    #[serde(rename = "Upload data")]
    UploadData,
    /// May create groups
    #[serde(rename = "Manage groups")]
    ManageGroups,
    /// Bypasses every visibility and ownership check
    #[serde(rename = "System admin")]
    SystemAdmin,
}

impl Acl {
    /// Every ACL, in privilege order.
    pub const ALL: [Acl; 4] = [
        Acl::Comment,
        Acl::UploadData,
        Acl::ManageGroups,
        Acl::SystemAdmin,
    ];

    /// Wire name of the ACL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Comment => "Comment",
            Acl::UploadData => "Upload data",
            Acl::ManageGroups => "Manage groups",
            Acl::SystemAdmin => "System admin",
        }
    }
}

impl std::fmt::Display for Acl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named bundles of ACLs.
///
/// ## Role Hierarchy
///
/// - `ViewOnly` - Reads whatever their groups can see
/// - `FullUser` - Also comments and uploads data
/// - `GroupAdmin` - Also creates and manages groups
/// - `SuperAdmin` - Full access to everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ViewOnly,
    FullUser,
    GroupAdmin,
    SuperAdmin,
}

impl Role {
    /// ACLs granted by this role.
    pub fn acls(&self) -> BTreeSet<Acl> {
        let granted: &[Acl] = match self {
            Role::ViewOnly => &[],
            Role::FullUser => &[Acl::Comment, Acl::UploadData],
            Role::GroupAdmin => &[Acl::Comment, Acl::UploadData, Acl::ManageGroups],
            Role::SuperAdmin => &Acl::ALL,
        };
        granted.iter().copied().collect()
    }

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "view_only" => Some(Role::ViewOnly),
            "full_user" => Some(Role::FullUser),
            "group_admin" => Some(Role::GroupAdmin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Least privilege.
    fn default() -> Self {
        Role::ViewOnly
    }
}
