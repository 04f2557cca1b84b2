// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated user representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Acl;
use crate::storage::StoredUser;

/// Claims carried by a bearer token.
///
/// Only `sub` is meaningful for authorization; ACLs and group memberships
/// are always read from storage so revocations apply immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the registered user ID
    pub sub: String,
    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,
    /// Issuer
    #[serde(default)]
    pub iss: String,
}

/// The user making a request, with ACLs and group memberships resolved.
///
/// This is the actor every access decision is made for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Registered user ID
    pub user_id: String,
    /// Display name
    pub username: String,
    /// Granted ACLs
    pub acls: BTreeSet<Acl>,
    /// Groups the user belongs to
    pub group_ids: BTreeSet<String>,
    /// Token expiration (Unix timestamp, 0 when the token has none)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build the actor from a stored user and their group memberships.
    pub fn from_stored(user: StoredUser, group_ids: BTreeSet<String>, expires_at: i64) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            acls: user.acls,
            group_ids,
            expires_at,
        }
    }

    /// Whether the user holds the system admin ACL.
    pub fn is_system_admin(&self) -> bool {
        self.acls.contains(&Acl::SystemAdmin)
    }

    /// Whether the user holds an ACL. System admins hold all of them.
    pub fn has_acl(&self, acl: Acl) -> bool {
        self.is_system_admin() || self.acls.contains(&acl)
    }

    /// Whether the user belongs to a group.
    pub fn is_member(&self, group_id: &str) -> bool {
        self.group_ids.contains(group_id)
    }
}
