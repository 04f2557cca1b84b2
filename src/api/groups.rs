// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Group management endpoints.
//!
//! Groups are created by users holding `Manage groups`; the creator becomes
//! the first member and group admin. Membership changes require being an
//! admin of that group or a system admin.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::extract::ApiJson;
use super::scope::found;
use crate::{
    access::{require_acl, AccessError},
    audit_log,
    auth::{Acl, Auth, AuthenticatedUser},
    error::ApiError,
    models::{AddGroupUserRequest, ApiResponse, CreateGroupRequest, IdResponse},
    state::AppState,
    storage::{AuditEventType, GroupRepository, StoredGroup, UserRepository},
};

const INVALID_GROUP_ID: &str = "Invalid group ID";

fn ensure_group_admin(user: &AuthenticatedUser, group: &StoredGroup) -> Result<(), ApiError> {
    if user.is_system_admin() || group.has_admin(&user.user_id) {
        Ok(())
    } else {
        Err(AccessError::InsufficientPermissions.into())
    }
}

/// Create a group.
#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = ApiResponse<IdResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_group(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    require_acl(&user, Acl::ManageGroups)?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("Group name must not be empty"));
    }

    let storage = state.storage.write().await;
    let groups = GroupRepository::new(&storage);
    if groups.find_by_name(&name)?.is_some() {
        return Err(ApiError::validation(format!("Group '{name}' already exists")));
    }

    let users = UserRepository::new(&storage);
    let mut member_ids: BTreeSet<String> = request.member_ids.unwrap_or_default().into_iter().collect();
    let unknown: Vec<&str> = member_ids
        .iter()
        .filter(|id| !users.exists(id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::validation(format!(
            "Invalid user IDs: {}",
            unknown.join(", ")
        )));
    }
    member_ids.insert(user.user_id.clone());

    let group = StoredGroup {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        member_ids,
        admin_ids: [user.user_id.clone()].into_iter().collect(),
        created_at: Utc::now(),
    };
    groups.create(&group)?;

    audit_log!(&storage, AuditEventType::GroupCreated, &user, "group", &group.id);
    tracing::info!(group_id = %group.id, name = %group.name, "Group created");

    Ok(Json(ApiResponse::success(IdResponse { id: group.id })))
}

/// List groups the requester belongs to, or every group for a system admin.
#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "Groups",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Groups", body = ApiResponse<Vec<StoredGroup>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_groups(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StoredGroup>>>, ApiError> {
    let storage = state.storage.read().await;
    let groups = GroupRepository::new(&storage);

    let listed = if user.is_system_admin() {
        groups.list_all()?
    } else {
        groups.list_for_member(&user.user_id)?
    };
    Ok(Json(ApiResponse::success(listed)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group", body = ApiResponse<StoredGroup>),
        (status = 400, description = "Invalid group ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_group(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<ApiResponse<StoredGroup>>, ApiError> {
    let storage = state.storage.read().await;
    let group = found(GroupRepository::new(&storage).get(&group_id), INVALID_GROUP_ID)?;

    if !user.is_system_admin() && !group.has_member(&user.user_id) {
        return Err(AccessError::InsufficientPermissions.into());
    }
    Ok(Json(ApiResponse::success(group)))
}

/// Add a user to a group.
#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/users",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(("group_id" = String, Path, description = "Group ID")),
    request_body = AddGroupUserRequest,
    responses(
        (status = 200, description = "Member added", body = ApiResponse<StoredGroup>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn add_group_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    ApiJson(request): ApiJson<AddGroupUserRequest>,
) -> Result<Json<ApiResponse<StoredGroup>>, ApiError> {
    let storage = state.storage.write().await;
    let groups = GroupRepository::new(&storage);

    let mut group = found(groups.get(&group_id), INVALID_GROUP_ID)?;
    ensure_group_admin(&user, &group)?;
    if !UserRepository::new(&storage).exists(&request.user_id) {
        return Err(ApiError::not_found("Invalid user ID"));
    }

    group.member_ids.insert(request.user_id.clone());
    if request.admin {
        group.admin_ids.insert(request.user_id.clone());
    }
    groups.update(&group)?;

    audit_log!(&storage, AuditEventType::GroupMemberAdded, &user, "group", &group.id);

    Ok(Json(ApiResponse::success(group)))
}

/// Remove a user from a group.
#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}/users/{user_id}",
    tag = "Groups",
    security(("bearer_auth" = [])),
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<StoredGroup>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn remove_group_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((group_id, member_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<StoredGroup>>, ApiError> {
    let storage = state.storage.write().await;
    let groups = GroupRepository::new(&storage);

    let mut group = found(groups.get(&group_id), INVALID_GROUP_ID)?;
    ensure_group_admin(&user, &group)?;
    if !group.member_ids.remove(&member_id) {
        return Err(ApiError::not_found(format!(
            "User {member_id} is not a member of group {group_id}"
        )));
    }
    group.admin_ids.remove(&member_id);
    groups.update(&group)?;

    audit_log!(&storage, AuditEventType::GroupMemberRemoved, &user, "group", &group.id);

    Ok(Json(ApiResponse::success(group)))
}
