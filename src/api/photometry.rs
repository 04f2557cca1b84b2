// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Photometry endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::extract::{ApiJson, ApiQuery};
use super::scope::{found, initial_groups, require_finite, visible_source};
use crate::{
    access::{ensure_modify, ensure_view, require_acl},
    audit_log,
    auth::{Acl, Auth},
    error::ApiError,
    models::{
        ApiResponse, CreatePhotometryRequest, IdsResponse, PhotometryFluxResponse,
        PhotometryFormat, PhotometryMagResponse, PhotometryQuery, PhotometryResponse,
    },
    state::AppState,
    storage::{AuditEventType, PhotometryRepository, StoredPhotometry},
};

const INVALID_PHOTOMETRY_ID: &str = "Invalid photometry ID";

impl PhotometryResponse {
    pub fn render(point: StoredPhotometry, format: PhotometryFormat) -> Self {
        match format {
            PhotometryFormat::Flux => PhotometryResponse::Flux(PhotometryFluxResponse {
                id: point.id,
                obj_id: point.obj_id,
                mjd: point.mjd,
                filter: point.filter,
                flux: point.flux,
                fluxerr: point.fluxerr,
                zp: point.zp,
                magsys: point.magsys,
                instrument_id: point.instrument_id,
                owner_id: point.owner_id,
                group_ids: point.group_ids.into_iter().collect(),
            }),
            PhotometryFormat::Mag => {
                let magnitude = point.magnitude();
                PhotometryResponse::Mag(PhotometryMagResponse {
                    mag: magnitude.map(|(mag, _)| mag),
                    magerr: magnitude.map(|(_, magerr)| magerr),
                    id: point.id,
                    obj_id: point.obj_id,
                    mjd: point.mjd,
                    filter: point.filter,
                    magsys: point.magsys,
                    instrument_id: point.instrument_id,
                    owner_id: point.owner_id,
                    group_ids: point.group_ids.into_iter().collect(),
                })
            }
        }
    }
}

fn validate(request: &CreatePhotometryRequest) -> Result<(), ApiError> {
    require_finite("mjd", request.mjd)?;
    require_finite("fluxerr", request.fluxerr)?;
    require_finite("zp", request.zp)?;
    if let Some(flux) = request.flux {
        require_finite("flux", flux)?;
    }
    if request.fluxerr < 0.0 {
        return Err(ApiError::validation("fluxerr must not be negative"));
    }
    if request.filter.trim().is_empty() {
        return Err(ApiError::validation("filter must not be empty"));
    }
    Ok(())
}

/// Upload a photometry point.
#[utoipa::path(
    post,
    path = "/api/photometry",
    tag = "Photometry",
    security(("bearer_auth" = [])),
    request_body = CreatePhotometryRequest,
    responses(
        (status = 200, description = "Photometry stored", body = ApiResponse<IdsResponse>),
        (status = 400, description = "Invalid request or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn post_photometry(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePhotometryRequest>,
) -> Result<Json<ApiResponse<IdsResponse>>, ApiError> {
    require_acl(&user, Acl::UploadData)?;
    validate(&request)?;

    let storage = state.storage.write().await;
    visible_source(&storage, &user, &request.obj_id)?;
    let group_ids = initial_groups(&storage, &user, request.group_ids)?;

    let point = StoredPhotometry {
        id: uuid::Uuid::new_v4().to_string(),
        obj_id: request.obj_id,
        mjd: request.mjd,
        flux: request.flux,
        fluxerr: request.fluxerr,
        zp: request.zp,
        magsys: request.magsys,
        filter: request.filter,
        instrument_id: request.instrument_id,
        owner_id: user.user_id.clone(),
        group_ids,
        created_at: Utc::now(),
    };
    PhotometryRepository::new(&storage).create(&point)?;

    audit_log!(&storage, AuditEventType::PhotometryCreated, &user, "photometry", &point.id);

    Ok(Json(ApiResponse::success(IdsResponse {
        ids: vec![point.id],
    })))
}

/// Retrieve a photometry point as flux or magnitude.
#[utoipa::path(
    get,
    path = "/api/photometry/{photometry_id}",
    tag = "Photometry",
    security(("bearer_auth" = [])),
    params(
        ("photometry_id" = String, Path, description = "Photometry ID"),
        ("format" = Option<PhotometryFormat>, Query, description = "`flux` (default) or `mag`")
    ),
    responses(
        (status = 200, description = "Photometry point", body = ApiResponse<PhotometryResponse>),
        (status = 400, description = "Invalid photometry ID or insufficient permissions"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_photometry(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(photometry_id): Path<String>,
    ApiQuery(query): ApiQuery<PhotometryQuery>,
) -> Result<Json<ApiResponse<PhotometryResponse>>, ApiError> {
    let storage = state.storage.read().await;
    let point = found(
        PhotometryRepository::new(&storage).get(&photometry_id),
        INVALID_PHOTOMETRY_ID,
    )?;
    ensure_view(&user, &point)?;

    let format = query.format.unwrap_or_default();
    Ok(Json(ApiResponse::success(PhotometryResponse::render(point, format))))
}

/// Delete a photometry point.
#[utoipa::path(
    delete,
    path = "/api/photometry/{photometry_id}",
    tag = "Photometry",
    security(("bearer_auth" = [])),
    params(("photometry_id" = String, Path, description = "Photometry ID")),
    responses(
        (status = 200, description = "Photometry deleted", body = ApiResponse<IdsResponse>),
        (status = 400, description = "Invalid photometry ID or not the owner"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_photometry(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(photometry_id): Path<String>,
) -> Result<Json<ApiResponse<IdsResponse>>, ApiError> {
    let storage = state.storage.write().await;
    let repo = PhotometryRepository::new(&storage);

    let point = found(repo.get(&photometry_id), INVALID_PHOTOMETRY_ID)?;
    ensure_modify(&user, &point, "delete")?;
    repo.delete(&point.id)?;

    audit_log!(&storage, AuditEventType::PhotometryDeleted, &user, "photometry", &point.id);

    Ok(Json(ApiResponse::success(IdsResponse {
        ids: vec![point.id],
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::TestApp;
    use crate::auth::Role;
    use crate::storage::MagSys;

    fn point_request(flux: Option<f64>) -> CreatePhotometryRequest {
        CreatePhotometryRequest {
            obj_id: "ZTF21aaqjmps".to_string(),
            mjd: 59408.0,
            flux,
            fluxerr: 0.031,
            zp: 25.0,
            magsys: MagSys::Ab,
            filter: "ztfg".to_string(),
            instrument_id: None,
            group_ids: None,
        }
    }

    async fn upload(app: &TestApp, flux: Option<f64>) -> (crate::auth::AuthenticatedUser, String) {
        let owner = app.user("owner", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;
        let Json(created) = post_photometry(Auth(owner.clone()), State(app.state()), ApiJson(point_request(flux)))
            .await
            .unwrap();
        (owner, created.data.ids[0].clone())
    }

    #[tokio::test]
    async fn magnitude_format_converts_flux() {
        let app = TestApp::new();
        let (owner, id) = upload(&app, Some(100.0)).await;

        let query = PhotometryQuery {
            format: Some(PhotometryFormat::Mag),
        };
        let Json(fetched) = get_photometry(Auth(owner), State(app.state()), Path(id), ApiQuery(query))
            .await
            .unwrap();
        match fetched.data {
            PhotometryResponse::Mag(mag) => {
                assert!((mag.mag.unwrap() - 20.0).abs() < 1e-9);
                assert!(mag.magerr.is_some());
            }
            PhotometryResponse::Flux(_) => panic!("expected magnitude representation"),
        }
    }

    #[tokio::test]
    async fn non_detection_has_no_magnitude() {
        let app = TestApp::new();
        let (owner, id) = upload(&app, None).await;

        let query = PhotometryQuery {
            format: Some(PhotometryFormat::Mag),
        };
        let Json(fetched) = get_photometry(Auth(owner), State(app.state()), Path(id), ApiQuery(query))
            .await
            .unwrap();
        let value = serde_json::to_value(fetched.data).unwrap();
        assert!(value["mag"].is_null());
    }

    #[tokio::test]
    async fn negative_fluxerr_is_rejected() {
        let app = TestApp::new();
        let owner = app.user("owner", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g1"]).await;

        let mut request = point_request(Some(1.0));
        request.fluxerr = -1.0;
        let err = post_photometry(Auth(owner), State(app.state()), ApiJson(request))
            .await
            .unwrap_err();
        assert!(err.message.contains("fluxerr"));
    }

    #[tokio::test]
    async fn upload_requires_visible_source() {
        let app = TestApp::new();
        let owner = app.user("owner", Role::FullUser, &["g1"]).await;
        app.source("ZTF21aaqjmps", &["g2"]).await;

        let err = post_photometry(Auth(owner), State(app.state()), ApiJson(point_request(Some(1.0))))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Insufficient permissions.");
    }

    #[tokio::test]
    async fn owner_deletes_and_point_is_gone() {
        let app = TestApp::new();
        let (owner, id) = upload(&app, Some(5.0)).await;

        delete_photometry(Auth(owner.clone()), State(app.state()), Path(id.clone()))
            .await
            .unwrap();
        let err = get_photometry(
            Auth(owner),
            State(app.state()),
            Path(id),
            ApiQuery(PhotometryQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, INVALID_PHOTOMETRY_ID);
    }
}
