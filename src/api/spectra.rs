// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spectrum endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};

use super::extract::ApiJson;
use super::scope::{found, initial_groups, visible_source};
use crate::{
    access::{ensure_modify, ensure_view, require_acl},
    audit_log,
    auth::{Acl, Auth},
    error::ApiError,
    models::{ApiResponse, CreateSpectrumRequest, IdResponse},
    state::AppState,
    storage::{AuditEventType, SpectrumRepository, StoredSpectrum},
};

const INVALID_SPECTRUM_ID: &str = "Invalid spectrum ID";

/// Naive layouts, read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an observation timestamp.
pub(crate) fn parse_observed_at(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::validation(format!("Invalid observed_at timestamp: {raw}")))
}

fn validate(request: &CreateSpectrumRequest) -> Result<(), ApiError> {
    if request.wavelengths.is_empty() {
        return Err(ApiError::validation("wavelengths must not be empty"));
    }
    if request.wavelengths.len() != request.fluxes.len() {
        return Err(ApiError::validation(
            "wavelengths and fluxes must have the same length",
        ));
    }
    if let Some(errors) = &request.errors {
        if errors.len() != request.wavelengths.len() {
            return Err(ApiError::validation(
                "errors must have the same length as wavelengths",
            ));
        }
    }

    let mut all_values = request
        .wavelengths
        .iter()
        .chain(&request.fluxes)
        .chain(request.errors.iter().flatten());
    if all_values.any(|v| !v.is_finite()) {
        return Err(ApiError::validation("Spectrum values must be finite numbers"));
    }
    Ok(())
}

/// Upload a spectrum.
#[utoipa::path(
    post,
    path = "/api/spectrum",
    tag = "Spectra",
    security(("bearer_auth" = [])),
    request_body = CreateSpectrumRequest,
    responses(
        (status = 200, description = "Spectrum stored", body = ApiResponse<IdResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn post_spectrum(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSpectrumRequest>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    require_acl(&user, Acl::UploadData)?;
    validate(&request)?;
    let observed_at = parse_observed_at(&request.observed_at)?;

    let storage = state.storage.write().await;
    visible_source(&storage, &user, &request.obj_id)?;
    let group_ids = initial_groups(&storage, &user, request.group_ids)?;

    let spectrum = StoredSpectrum {
        id: uuid::Uuid::new_v4().to_string(),
        obj_id: request.obj_id,
        observed_at,
        wavelengths: request.wavelengths,
        fluxes: request.fluxes,
        errors: request.errors,
        instrument_id: request.instrument_id,
        owner_id: user.user_id.clone(),
        group_ids,
        created_at: Utc::now(),
    };
    SpectrumRepository::new(&storage).create(&spectrum)?;

    audit_log!(&storage, AuditEventType::SpectrumCreated, &user, "spectrum", &spectrum.id);

    Ok(Json(ApiResponse::success(IdResponse { id: spectrum.id })))
}

/// Retrieve a spectrum.
#[utoipa::path(
    get,
    path = "/api/spectrum/{spectrum_id}",
    tag = "Spectra",
    security(("bearer_auth" = [])),
    params(("spectrum_id" = String, Path, description = "Spectrum ID")),
    responses(
        (status = 200, description = "Spectrum", body = ApiResponse<StoredSpectrum>),
        (status = 400, description = "Invalid spectrum ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_spectrum(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(spectrum_id): Path<String>,
) -> Result<Json<ApiResponse<StoredSpectrum>>, ApiError> {
    let storage = state.storage.read().await;
    let spectrum = found(
        SpectrumRepository::new(&storage).get(&spectrum_id),
        INVALID_SPECTRUM_ID,
    )?;
    ensure_view(&user, &spectrum)?;

    Ok(Json(ApiResponse::success(spectrum)))
}

/// Delete a spectrum.
#[utoipa::path(
    delete,
    path = "/api/spectrum/{spectrum_id}",
    tag = "Spectra",
    security(("bearer_auth" = [])),
    params(("spectrum_id" = String, Path, description = "Spectrum ID")),
    responses(
        (status = 200, description = "Spectrum deleted", body = ApiResponse<IdResponse>),
        (status = 400, description = "Invalid spectrum ID or not the owner"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_spectrum(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(spectrum_id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let storage = state.storage.write().await;
    let repo = SpectrumRepository::new(&storage);

    let spectrum = found(repo.get(&spectrum_id), INVALID_SPECTRUM_ID)?;
    ensure_modify(&user, &spectrum, "delete")?;
    repo.delete(&spectrum.id)?;

    audit_log!(&storage, AuditEventType::SpectrumDeleted, &user, "spectrum", &spectrum.id);

    Ok(Json(ApiResponse::success(IdResponse { id: spectrum.id })))
}
