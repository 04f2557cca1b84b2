// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request and response bodies.
//!
//! Every response is wrapped in an envelope: `{"status": "success", "data": ...}`
//! on success and `{"status": "error", "message": ...}` on failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Acl, Role};
use crate::storage::MagSys;

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// Success envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `success`
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
        }
    }
}

/// Error envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `error`
    pub status: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdsResponse {
    pub ids: Vec<String>,
}

// =========================================================================
// Comments
// =========================================================================

/// An attachment uploaded with a new comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentUpload {
    /// Base64-encoded content
    pub body: String,
    /// File name to report back
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    /// Source the comment is about
    pub obj_id: String,
    pub text: String,
    /// Groups to share with; defaults to the poster's groups
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentIdResponse {
    pub comment_id: String,
}

/// Fields to change on an existing comment.
///
/// `attachment_bytes` and `attachment_name` travel together.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Replaces the group set
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
    /// Base64-encoded content
    #[serde(default)]
    pub attachment_bytes: Option<String>,
    #[serde(default)]
    pub attachment_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub obj_id: String,
    pub text: String,
    pub author_id: String,
    pub group_ids: Vec<String>,
    pub attachment_name: Option<String>,
    /// Base64-encoded content; only filled when a single comment is fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_bytes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

// =========================================================================
// Photometry
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePhotometryRequest {
    pub obj_id: String,
    /// Modified Julian Date of the observation
    pub mjd: f64,
    /// Flux in the zero point's system; null for a non-detection
    #[serde(default)]
    pub flux: Option<f64>,
    pub fluxerr: f64,
    pub zp: f64,
    pub magsys: MagSys,
    pub filter: String,
    #[serde(default)]
    pub instrument_id: Option<String>,
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
}

/// Representation requested for a photometry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PhotometryFormat {
    #[default]
    Flux,
    Mag,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotometryQuery {
    #[serde(default)]
    pub format: Option<PhotometryFormat>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhotometryFluxResponse {
    pub id: String,
    pub obj_id: String,
    pub mjd: f64,
    pub filter: String,
    pub flux: Option<f64>,
    pub fluxerr: f64,
    pub zp: f64,
    pub magsys: MagSys,
    pub instrument_id: Option<String>,
    pub owner_id: String,
    pub group_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhotometryMagResponse {
    pub id: String,
    pub obj_id: String,
    pub mjd: f64,
    pub filter: String,
    /// Null for non-detections
    pub mag: Option<f64>,
    pub magerr: Option<f64>,
    pub magsys: MagSys,
    pub instrument_id: Option<String>,
    pub owner_id: String,
    pub group_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PhotometryResponse {
    Flux(PhotometryFluxResponse),
    Mag(PhotometryMagResponse),
}

// =========================================================================
// Spectra
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSpectrumRequest {
    pub obj_id: String,
    /// RFC 3339, or `YYYY-MM-DD HH:MM:SS[.ffffff]` in UTC
    pub observed_at: String,
    pub wavelengths: Vec<f64>,
    pub fluxes: Vec<f64>,
    #[serde(default)]
    pub errors: Option<Vec<f64>>,
    #[serde(default)]
    pub instrument_id: Option<String>,
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
}

// =========================================================================
// Sources
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSourceRequest {
    pub id: String,
    /// Right ascension in degrees
    #[serde(default)]
    pub ra: Option<f64>,
    /// Declination in degrees
    #[serde(default)]
    pub dec: Option<f64>,
    #[serde(default)]
    pub group_ids: Option<Vec<String>>,
}

// =========================================================================
// Sharing
// =========================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ShareRequest {
    #[serde(rename = "photometryIDs", default)]
    pub photometry_ids: Vec<String>,
    #[serde(rename = "spectrumIDs", default)]
    pub spectrum_ids: Vec<String>,
    #[serde(rename = "groupIDs", default)]
    pub group_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareResponse {
    #[serde(rename = "photometryIDs")]
    pub photometry_ids: Vec<String>,
    #[serde(rename = "spectrumIDs")]
    pub spectrum_ids: Vec<String>,
    #[serde(rename = "groupIDs")]
    pub group_ids: Vec<String>,
}

// =========================================================================
// Groups & users
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddGroupUserRequest {
    pub user_id: String,
    /// Also make the user a group admin
    #[serde(default)]
    pub admin: bool,
}

/// New user. Give either explicit `acls` or a `role` preset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub acls: Option<Vec<Acl>>,
    #[serde(default)]
    pub role: Option<Role>,
}
