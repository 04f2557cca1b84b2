// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Photometry measurements.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::access::{GroupScoped, OwnedResource};

/// Magnitude system a zero point refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MagSys {
    Ab,
    Vega,
}

/// A single photometric point stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredPhotometry {
    /// Unique measurement identifier (UUID)
    pub id: String,
    /// Source the measurement belongs to
    pub obj_id: String,
    /// Modified Julian Date of the observation
    pub mjd: f64,
    /// Flux in units set by `zp`; `None` for a non-detection
    pub flux: Option<f64>,
    /// One-sigma flux uncertainty
    pub fluxerr: f64,
    /// Zero point such that `mag = -2.5 log10(flux) + zp`
    pub zp: f64,
    /// Magnitude system of the zero point
    pub magsys: MagSys,
    /// Bandpass name (e.g. `ztfg`)
    pub filter: String,
    /// Instrument that took the measurement
    pub instrument_id: Option<String>,
    /// User who uploaded the measurement
    pub owner_id: String,
    /// Groups the measurement is visible to
    pub group_ids: BTreeSet<String>,
    /// When the measurement was uploaded
    pub created_at: DateTime<Utc>,
}

impl StoredPhotometry {
    /// AB-style magnitude and its uncertainty; `None` without positive flux.
    pub fn magnitude(&self) -> Option<(f64, f64)> {
        let flux = self.flux.filter(|flux| *flux > 0.0 && flux.is_finite())?;
        let mag = -2.5 * flux.log10() + self.zp;
        let magerr = 2.5 / std::f64::consts::LN_10 * (self.fluxerr / flux);
        Some((mag, magerr))
    }
}

impl OwnedResource for StoredPhotometry {
    const KIND: &'static str = "photometry";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn owner_user_id(&self) -> &str {
        &self.owner_id
    }
}

impl GroupScoped for StoredPhotometry {
    fn group_ids(&self) -> &BTreeSet<String> {
        &self.group_ids
    }
}

impl Record for StoredPhotometry {
    const COLLECTION: &'static str = "photometry";
    const LABEL: &'static str = "Photometry";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for photometry records.
pub type PhotometryRepository<'a> = Repository<'a, StoredPhotometry>;
