// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Acl, AuthenticatedUser, Role},
    models::{
        AddGroupUserRequest, AttachmentUpload, CommentIdResponse, CommentResponse,
        CreateCommentRequest, CreateGroupRequest, CreatePhotometryRequest, CreateSourceRequest,
        CreateSpectrumRequest, CreateUserRequest, ErrorEnvelope, IdResponse, IdsResponse,
        PhotometryFluxResponse, PhotometryFormat, PhotometryMagResponse, PhotometryResponse,
        ShareRequest, ShareResponse, UpdateCommentRequest,
    },
    state::AppState,
    storage::{MagSys, StoredGroup, StoredSource, StoredSpectrum},
};

pub mod comments;
pub mod extract;
pub mod groups;
pub mod health;
pub mod photometry;
mod scope;
pub mod sharing;
pub mod sources;
pub mod spectra;
pub mod users;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
pub(crate) mod test_support;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/comment", post(comments::post_comment))
        .route(
            "/comment/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/photometry", post(photometry::post_photometry))
        .route(
            "/photometry/{photometry_id}",
            get(photometry::get_photometry).delete(photometry::delete_photometry),
        )
        .route("/spectrum", post(spectra::post_spectrum))
        .route(
            "/spectrum/{spectrum_id}",
            get(spectra::get_spectrum).delete(spectra::delete_spectrum),
        )
        .route("/sources", post(sources::post_source))
        .route("/sources/{source_id}", get(sources::get_source))
        .route(
            "/sources/{source_id}/comments",
            get(sources::list_source_comments),
        )
        .route("/sharing", post(sharing::share_data))
        .route(
            "/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/groups/{group_id}", get(groups::get_group))
        .route("/groups/{group_id}/users", post(groups::add_group_user))
        .route(
            "/groups/{group_id}/users/{user_id}",
            delete(groups::remove_group_user),
        )
        .route("/user", post(users::create_user))
        .route("/internal/profile", get(users::get_profile));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        comments::post_comment,
        comments::get_comment,
        comments::update_comment,
        comments::delete_comment,
        photometry::post_photometry,
        photometry::get_photometry,
        photometry::delete_photometry,
        spectra::post_spectrum,
        spectra::get_spectrum,
        spectra::delete_spectrum,
        sources::post_source,
        sources::get_source,
        sources::list_source_comments,
        sharing::share_data,
        groups::create_group,
        groups::list_groups,
        groups::get_group,
        groups::add_group_user,
        groups::remove_group_user,
        users::create_user,
        users::get_profile
    ),
    components(
        schemas(
            ErrorEnvelope,
            IdResponse,
            IdsResponse,
            AttachmentUpload,
            CreateCommentRequest,
            UpdateCommentRequest,
            CommentIdResponse,
            CommentResponse,
            CreatePhotometryRequest,
            PhotometryFormat,
            PhotometryFluxResponse,
            PhotometryMagResponse,
            PhotometryResponse,
            MagSys,
            CreateSpectrumRequest,
            StoredSpectrum,
            CreateSourceRequest,
            StoredSource,
            ShareRequest,
            ShareResponse,
            CreateGroupRequest,
            AddGroupUserRequest,
            StoredGroup,
            CreateUserRequest,
            AuthenticatedUser,
            Acl,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Comments", description = "Comments on sources"),
        (name = "Photometry", description = "Photometric measurements"),
        (name = "Spectra", description = "Spectroscopic observations"),
        (name = "Sources", description = "Astronomical sources"),
        (name = "Sharing", description = "Extending the groups data is shared with"),
        (name = "Groups", description = "Group membership management"),
        (name = "Users", description = "User registration and profile")
    )
)]
struct ApiDoc;
