// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeSet;

use super::{AccessError, GroupScoped, OwnedResource};
use crate::auth::{Acl, AuthenticatedUser};

/// Group overlap or system admin. Ownership alone does not grant viewing:
/// a creator who places a record only in groups they are not a member of
/// cannot read it back, even though they may still modify and share it.
pub fn can_view<R: GroupScoped + ?Sized>(actor: &AuthenticatedUser, resource: &R) -> bool {
    actor.is_system_admin() || !actor.group_ids.is_disjoint(resource.group_ids())
}

pub fn can_modify<R: OwnedResource + ?Sized>(actor: &AuthenticatedUser, resource: &R) -> bool {
    actor.is_system_admin() || resource.owner_user_id() == actor.user_id
}

/// Whether `actor` may add `target_groups` to the resource.
///
/// Targets the actor is not a member of are allowed; the owner or admin
/// decides where their data goes.
pub fn can_share<R: OwnedResource + ?Sized>(
    actor: &AuthenticatedUser,
    resource: &R,
    target_groups: &BTreeSet<String>,
) -> bool {
    !target_groups.is_empty() && can_modify(actor, resource)
}

pub fn require_acl(actor: &AuthenticatedUser, acl: Acl) -> Result<(), AccessError> {
    if actor.has_acl(acl) {
        Ok(())
    } else {
        Err(AccessError::MissingAcl(acl))
    }
}

pub fn ensure_view<R: GroupScoped + ?Sized>(
    actor: &AuthenticatedUser,
    resource: &R,
) -> Result<(), AccessError> {
    if can_view(actor, resource) {
        Ok(())
    } else {
        Err(AccessError::InsufficientPermissions)
    }
}

pub fn ensure_modify<R: OwnedResource + ?Sized>(
    actor: &AuthenticatedUser,
    resource: &R,
    action: &'static str,
) -> Result<(), AccessError> {
    if can_modify(actor, resource) {
        Ok(())
    } else {
        Err(not_owner(resource, action))
    }
}

pub fn ensure_share<R: OwnedResource + ?Sized>(
    actor: &AuthenticatedUser,
    resource: &R,
    target_groups: &BTreeSet<String>,
) -> Result<(), AccessError> {
    if target_groups.is_empty() {
        return Err(AccessError::NoTargetGroups);
    }
    if !can_share(actor, resource, target_groups) {
        return Err(not_owner(resource, "share"));
    }
    Ok(())
}

fn not_owner<R: OwnedResource + ?Sized>(resource: &R, action: &'static str) -> AccessError {
    AccessError::NotOwner {
        kind: R::KIND,
        id: resource.resource_id().to_string(),
        action,
    }
}
