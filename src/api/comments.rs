// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Comment endpoints.
//!
//! Comments belong to a source and are visible to the groups they are
//! shared with. Only the author or a system admin may edit or delete one.

use axum::{
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;

use super::extract::ApiJson;
use super::scope::{found, initial_groups, visible_source};
use crate::{
    access::{ensure_modify, ensure_view, require_acl},
    audit_log,
    auth::{Acl, Auth},
    error::ApiError,
    models::{
        ApiResponse, CommentIdResponse, CommentResponse, CreateCommentRequest,
        UpdateCommentRequest,
    },
    state::AppState,
    storage::{AuditEventType, CommentRepository, StoredComment},
};

const INVALID_COMMENT_ID: &str = "Invalid comment ID";

impl CommentResponse {
    pub fn from_stored(comment: StoredComment, attachment_bytes: Option<String>) -> Self {
        Self {
            id: comment.id,
            obj_id: comment.obj_id,
            text: comment.text,
            author_id: comment.author_id,
            group_ids: comment.group_ids.into_iter().collect(),
            attachment_name: comment.attachment_name,
            attachment_bytes,
            created_at: comment.created_at,
            modified_at: comment.modified_at,
        }
    }
}

/// Decode attachment content, rejecting anything that is not base64.
fn decode_attachment(body: &str, name: &str) -> Result<Vec<u8>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Attachment name must not be empty"));
    }
    STANDARD
        .decode(body.trim())
        .map_err(|e| ApiError::validation(format!("Attachment is not valid base64: {e}")))
}

/// Post a comment on a source.
#[utoipa::path(
    post,
    path = "/api/comment",
    tag = "Comments",
    security(("bearer_auth" = [])),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = ApiResponse<CommentIdResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn post_comment(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentIdResponse>>, ApiError> {
    require_acl(&user, Acl::Comment)?;

    if request.text.trim().is_empty() {
        return Err(ApiError::validation("Comment text must not be empty"));
    }
    let attachment = request
        .attachment
        .as_ref()
        .map(|a| decode_attachment(&a.body, &a.name).map(|bytes| (a.name.clone(), bytes)))
        .transpose()?;

    let storage = state.storage.write().await;
    visible_source(&storage, &user, &request.obj_id)?;
    let group_ids = initial_groups(&storage, &user, request.group_ids)?;

    let now = Utc::now();
    let comment = StoredComment {
        id: uuid::Uuid::new_v4().to_string(),
        obj_id: request.obj_id,
        text: request.text,
        author_id: user.user_id.clone(),
        group_ids,
        attachment_name: attachment.as_ref().map(|(name, _)| name.clone()),
        created_at: now,
        modified_at: now,
    };

    let repo = CommentRepository::new(&storage);
    if let Some((_, bytes)) = &attachment {
        repo.write_attachment(&comment.id, bytes)?;
    }
    repo.create(&comment)?;

    audit_log!(&storage, AuditEventType::CommentCreated, &user, "comment", &comment.id);
    tracing::info!(comment_id = %comment.id, obj_id = %comment.obj_id, "Comment posted");

    Ok(Json(ApiResponse::success(CommentIdResponse {
        comment_id: comment.id,
    })))
}

/// Retrieve a comment, including its attachment.
#[utoipa::path(
    get,
    path = "/api/comment/{comment_id}",
    tag = "Comments",
    security(("bearer_auth" = [])),
    params(("comment_id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment", body = ApiResponse<CommentResponse>),
        (status = 400, description = "Invalid comment ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_comment(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<CommentResponse>>, ApiError> {
    let storage = state.storage.read().await;
    let repo = CommentRepository::new(&storage);

    let comment = found(repo.get(&comment_id), INVALID_COMMENT_ID)?;
    ensure_view(&user, &comment)?;

    let attachment_bytes = match comment.attachment_name {
        Some(_) => Some(STANDARD.encode(repo.read_attachment(&comment.id)?)),
        None => None,
    };

    Ok(Json(ApiResponse::success(CommentResponse::from_stored(
        comment,
        attachment_bytes,
    ))))
}

/// Edit a comment's text, groups or attachment.
#[utoipa::path(
    put,
    path = "/api/comment/{comment_id}",
    tag = "Comments",
    security(("bearer_auth" = [])),
    params(("comment_id" = String, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentIdResponse>),
        (status = 400, description = "Invalid request or not the author"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_comment(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    ApiJson(request): ApiJson<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<CommentIdResponse>>, ApiError> {
    let attachment = match (&request.attachment_bytes, &request.attachment_name) {
        (Some(body), Some(name)) => Some((name.clone(), decode_attachment(body, name)?)),
        (None, None) => None,
        _ => {
            return Err(ApiError::validation(
                "attachment_bytes and attachment_name must be supplied together",
            ))
        }
    };
    if request.text.as_deref().is_some_and(|text| text.trim().is_empty()) {
        return Err(ApiError::validation("Comment text must not be empty"));
    }

    let storage = state.storage.write().await;
    let repo = CommentRepository::new(&storage);

    let mut comment = found(repo.get(&comment_id), INVALID_COMMENT_ID)?;
    ensure_modify(&user, &comment, "update")?;

    if let Some(group_ids) = request.group_ids {
        comment.group_ids = super::scope::existing_groups(&storage, group_ids)?;
    }
    if let Some(text) = request.text {
        comment.text = text;
    }
    if let Some((name, bytes)) = attachment {
        repo.write_attachment(&comment.id, &bytes)?;
        comment.attachment_name = Some(name);
    }
    comment.modified_at = Utc::now();
    repo.update(&comment)?;

    audit_log!(&storage, AuditEventType::CommentUpdated, &user, "comment", &comment.id);

    Ok(Json(ApiResponse::success(CommentIdResponse {
        comment_id: comment.id,
    })))
}

/// Delete a comment and its attachment.
#[utoipa::path(
    delete,
    path = "/api/comment/{comment_id}",
    tag = "Comments",
    security(("bearer_auth" = [])),
    params(("comment_id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<CommentIdResponse>),
        (status = 400, description = "Invalid comment ID or not the author"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_comment(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<CommentIdResponse>>, ApiError> {
    let storage = state.storage.write().await;
    let repo = CommentRepository::new(&storage);

    let comment = found(repo.get(&comment_id), INVALID_COMMENT_ID)?;
    ensure_modify(&user, &comment, "delete")?;
    repo.delete_with_attachment(&comment.id)?;

    audit_log!(&storage, AuditEventType::CommentDeleted, &user, "comment", &comment.id);

    Ok(Json(ApiResponse::success(CommentIdResponse {
        comment_id: comment.id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::TestApp;
    use crate::auth::Role;
    use crate::models::AttachmentUpload;

    fn new_comment(text: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            obj_id: "ZTF21aaqjmps".to_string(),
            text: text.to_string(),
            group_ids: None,
            attachment: None,
        }
    }

    #[tokio::test]
    async fn post_and_get_with_attachment() {
        let app = TestApp::new();
        let author = app.user("author", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let mut request = new_comment("Fit attached");
        request.attachment = Some(AttachmentUpload {
            body: STANDARD.encode(b"chisq=20.29"),
            name: "fit.txt".to_string(),
        });

        let Json(created) = post_comment(Auth(author.clone()), State(app.state()), ApiJson(request))
            .await
            .unwrap();
        let comment_id = created.data.comment_id;

        let Json(fetched) = get_comment(Auth(author), State(app.state()), Path(comment_id))
            .await
            .unwrap();
        assert_eq!(fetched.data.text, "Fit attached");
        assert_eq!(fetched.data.attachment_name.as_deref(), Some("fit.txt"));
        assert_eq!(
            STANDARD.decode(fetched.data.attachment_bytes.unwrap()).unwrap(),
            b"chisq=20.29"
        );
        assert_eq!(fetched.data.group_ids, vec!["g1"]);
    }

    #[tokio::test]
    async fn view_only_user_cannot_post() {
        let app = TestApp::new();
        let viewer = app.user("viewer", Role::ViewOnly, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let err = post_comment(Auth(viewer), State(app.state()), ApiJson(new_comment("hi")))
            .await
            .unwrap_err();
        assert!(err.message.contains("permissions"));
    }

    #[tokio::test]
    async fn outsider_cannot_read() {
        let app = TestApp::new();
        let author = app.user("author", Role::FullUser, &["g1"]).await;
        let outsider = app.user("outsider", Role::FullUser, &["g2"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let Json(created) = post_comment(Auth(author), State(app.state()), ApiJson(new_comment("hi")))
            .await
            .unwrap();

        let err = get_comment(Auth(outsider), State(app.state()), Path(created.data.comment_id))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Insufficient permissions.");
    }

    #[tokio::test]
    async fn half_an_attachment_is_rejected() {
        let app = TestApp::new();
        let author = app.user("author", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let Json(created) = post_comment(Auth(author.clone()), State(app.state()), ApiJson(new_comment("hi")))
            .await
            .unwrap();

        let update = UpdateCommentRequest {
            attachment_name: Some("only-a-name.txt".to_string()),
            ..Default::default()
        };
        let err = update_comment(
            Auth(author),
            State(app.state()),
            Path(created.data.comment_id),
            ApiJson(update),
        )
        .await
        .unwrap_err();
        assert!(err.message.contains("together"));
    }

    #[tokio::test]
    async fn non_author_cannot_delete() {
        let app = TestApp::new();
        let author = app.user("author", Role::FullUser, &["g1"]).await;
        let colleague = app.user("colleague", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let Json(created) = post_comment(Auth(author), State(app.state()), ApiJson(new_comment("hi")))
            .await
            .unwrap();

        let err = delete_comment(Auth(colleague), State(app.state()), Path(created.data.comment_id))
            .await
            .unwrap_err();
        assert!(err.message.contains("owner"));
    }

    #[tokio::test]
    async fn unknown_id_is_rejected() {
        let app = TestApp::new();
        let author = app.user("author", Role::FullUser, &["g1"]).await;

        let err = get_comment(Auth(author), State(app.state()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_COMMENT_ID);
    }
}
