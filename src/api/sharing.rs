// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sharing endpoint.
//!
//! Adds groups to photometry points and spectra. Every named record is
//! loaded and checked before anything is written, and the whole request runs
//! under the storage write lock, so a request either shares everything it
//! names or nothing.
//!
//! Sharing photometry also adds the target groups to the parent source.
//! Sharing a spectrum leaves the source alone.

use std::collections::BTreeSet;

use axum::{extract::State, Json};
use serde_json::json;

use super::extract::ApiJson;
use super::scope::{existing_groups, found};
use crate::{
    access::{ensure_share, OwnedResource},
    auth::{Auth, AuthenticatedUser},
    error::ApiError,
    models::{ApiResponse, ShareRequest, ShareResponse},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, FileStorage, PhotometryRepository,
        SourceRepository, SpectrumRepository,
    },
};

/// Check one record, auditing a refused share.
fn check_share<R: OwnedResource>(
    storage: &FileStorage,
    user: &AuthenticatedUser,
    resource: &R,
    targets: &BTreeSet<String>,
) -> Result<(), ApiError> {
    ensure_share(user, resource, targets).map_err(|e| {
        AuditRepository::new(storage).record(
            AuditEvent::new(AuditEventType::PermissionDenied)
                .with_user(&user.user_id)
                .with_resource(R::KIND, resource.resource_id())
                .failed(e.to_string()),
        );
        tracing::warn!(
            user_id = %user.user_id,
            resource = R::KIND,
            resource_id = %resource.resource_id(),
            "Share refused"
        );
        ApiError::from(e)
    })
}

/// Share photometry and spectra with more groups.
#[utoipa::path(
    post,
    path = "/api/sharing",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    request_body = ShareRequest,
    responses(
        (status = 200, description = "Resources shared", body = ApiResponse<ShareResponse>),
        (status = 400, description = "Invalid request or not the owner"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn share_data(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ShareRequest>,
) -> Result<Json<ApiResponse<ShareResponse>>, ApiError> {
    let photometry_ids: BTreeSet<String> = request.photometry_ids.into_iter().collect();
    let spectrum_ids: BTreeSet<String> = request.spectrum_ids.into_iter().collect();
    if photometry_ids.is_empty() && spectrum_ids.is_empty() {
        return Err(ApiError::validation(
            "At least one photometry or spectrum ID is required",
        ));
    }

    let storage = state.storage.write().await;
    let targets = existing_groups(&storage, request.group_ids)?;

    let photometry_repo = PhotometryRepository::new(&storage);
    let spectrum_repo = SpectrumRepository::new(&storage);

    // Load and check everything first.
    let mut points = Vec::with_capacity(photometry_ids.len());
    for id in &photometry_ids {
        let point = found(photometry_repo.get(id), "Invalid photometry ID")?;
        check_share(&storage, &user, &point, &targets)?;
        points.push(point);
    }
    let mut spectra = Vec::with_capacity(spectrum_ids.len());
    for id in &spectrum_ids {
        let spectrum = found(spectrum_repo.get(id), "Invalid spectrum ID")?;
        check_share(&storage, &user, &spectrum, &targets)?;
        spectra.push(spectrum);
    }

    let source_repo = SourceRepository::new(&storage);
    for mut point in points {
        point.group_ids.extend(targets.iter().cloned());
        photometry_repo.update(&point)?;

        let added = source_repo.extend_groups(&point.obj_id, &targets)?;
        if !added.is_empty() {
            tracing::info!(
                source_id = %point.obj_id,
                added = ?added,
                "Source visibility extended by photometry share"
            );
        }
    }
    for mut spectrum in spectra {
        spectrum.group_ids.extend(targets.iter().cloned());
        spectrum_repo.update(&spectrum)?;
    }

    let response = ShareResponse {
        photometry_ids: photometry_ids.into_iter().collect(),
        spectrum_ids: spectrum_ids.into_iter().collect(),
        group_ids: targets.into_iter().collect(),
    };

    AuditRepository::new(&storage).record(
        AuditEvent::new(AuditEventType::ResourcesShared)
            .with_user(&user.user_id)
            .with_details(json!({
                "photometry_ids": response.photometry_ids,
                "spectrum_ids": response.spectrum_ids,
                "group_ids": response.group_ids,
            })),
    );
    tracing::info!(
        user_id = %user.user_id,
        photometry = response.photometry_ids.len(),
        spectra = response.spectrum_ids.len(),
        "Resources shared"
    );

    Ok(Json(ApiResponse::success(response)))
}
