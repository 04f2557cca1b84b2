// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Source endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::extract::ApiJson;
use super::scope::{initial_groups, require_finite, visible_source};
use crate::{
    access::{can_view, require_acl},
    audit_log,
    auth::{Acl, Auth},
    error::ApiError,
    models::{ApiResponse, CommentResponse, CreateSourceRequest, IdResponse},
    state::AppState,
    storage::{
        paths::is_valid_id, AuditEventType, CommentRepository, SourceRepository, StoredSource,
    },
};

fn validate(request: &CreateSourceRequest) -> Result<(), ApiError> {
    if !is_valid_id(&request.id) {
        return Err(ApiError::validation(format!(
            "Invalid source identifier: {}",
            request.id
        )));
    }
    if let Some(ra) = request.ra {
        require_finite("ra", ra)?;
        if !(0.0..360.0).contains(&ra) {
            return Err(ApiError::validation("ra must be in [0, 360)"));
        }
    }
    if let Some(dec) = request.dec {
        require_finite("dec", dec)?;
        if !(-90.0..=90.0).contains(&dec) {
            return Err(ApiError::validation("dec must be in [-90, 90]"));
        }
    }
    Ok(())
}

/// Register a source.
#[utoipa::path(
    post,
    path = "/api/sources",
    tag = "Sources",
    security(("bearer_auth" = [])),
    request_body = CreateSourceRequest,
    responses(
        (status = 200, description = "Source created", body = ApiResponse<IdResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn post_source(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSourceRequest>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    require_acl(&user, Acl::UploadData)?;
    validate(&request)?;

    let storage = state.storage.write().await;
    let group_ids = initial_groups(&storage, &user, request.group_ids)?;

    let source = StoredSource {
        id: request.id,
        ra: request.ra,
        dec: request.dec,
        group_ids,
        created_by: user.user_id.clone(),
        created_at: Utc::now(),
    };
    SourceRepository::new(&storage).create(&source)?;

    audit_log!(&storage, AuditEventType::SourceCreated, &user, "source", &source.id);
    tracing::info!(source_id = %source.id, "Source registered");

    Ok(Json(ApiResponse::success(IdResponse { id: source.id })))
}

/// Retrieve a source.
#[utoipa::path(
    get,
    path = "/api/sources/{source_id}",
    tag = "Sources",
    security(("bearer_auth" = [])),
    params(("source_id" = String, Path, description = "Source ID")),
    responses(
        (status = 200, description = "Source", body = ApiResponse<StoredSource>),
        (status = 400, description = "Invalid source ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_source(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<ApiResponse<StoredSource>>, ApiError> {
    let storage = state.storage.read().await;
    let source = visible_source(&storage, &user, &source_id)?;
    Ok(Json(ApiResponse::success(source)))
}

/// List the comments on a source that the requester may see.
#[utoipa::path(
    get,
    path = "/api/sources/{source_id}/comments",
    tag = "Sources",
    security(("bearer_auth" = [])),
    params(("source_id" = String, Path, description = "Source ID")),
    responses(
        (status = 200, description = "Visible comments, oldest first", body = ApiResponse<Vec<CommentResponse>>),
        (status = 400, description = "Invalid source ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_source_comments(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<CommentResponse>>>, ApiError> {
    let storage = state.storage.read().await;
    let source = visible_source(&storage, &user, &source_id)?;

    let comments = CommentRepository::new(&storage)
        .list_by_obj(&source.id)?
        .into_iter()
        .filter(|comment| can_view(&user, comment))
        .map(|comment| CommentResponse::from_stored(comment, None))
        .collect();

    Ok(Json(ApiResponse::success(comments)))
}
