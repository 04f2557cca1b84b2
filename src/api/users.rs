// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User registration and profile endpoints.

use std::collections::BTreeSet;

use axum::{extract::State, Json};
use chrono::Utc;

use super::extract::ApiJson;
use crate::{
    audit_log,
    auth::{Acl, Auth, AuthenticatedUser, Role, SystemAdminOnly},
    error::ApiError,
    models::{ApiResponse, CreateUserRequest, IdResponse},
    state::AppState,
    storage::{AuditEventType, StoredUser, UserRepository},
};

fn requested_acls(request: &CreateUserRequest) -> Result<BTreeSet<Acl>, ApiError> {
    match (&request.acls, request.role) {
        (Some(_), Some(_)) => Err(ApiError::validation("Give either acls or role, not both")),
        (Some(acls), None) => Ok(acls.iter().copied().collect()),
        (None, Some(role)) => Ok(role.acls()),
        (None, None) => Ok(Role::default().acls()),
    }
}

/// Register a user. System admins only.
#[utoipa::path(
    post,
    path = "/api/user",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<IdResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_user(
    SystemAdminOnly(admin): SystemAdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::validation("Username must not be empty"));
    }
    let acls = requested_acls(&request)?;

    let storage = state.storage.write().await;
    let users = UserRepository::new(&storage);
    if users.find_by_username(&username)?.is_some() {
        return Err(ApiError::validation(format!("User '{username}' already exists")));
    }

    let user = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        username,
        acls,
        created_at: Utc::now(),
    };
    users.create(&user)?;

    audit_log!(&storage, AuditEventType::UserCreated, &admin, "user", &user.id);
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Json(ApiResponse::success(IdResponse { id: user.id })))
}

/// The requester's identity, ACLs and groups.
#[utoipa::path(
    get,
    path = "/api/internal/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<AuthenticatedUser>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(Auth(user): Auth) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(user))
}
