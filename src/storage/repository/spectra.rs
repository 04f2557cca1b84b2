// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spectra.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Record, Repository};
use crate::access::{GroupScoped, OwnedResource};

/// Spectrum stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredSpectrum {
    /// Unique spectrum identifier (UUID)
    pub id: String,
    /// Source the spectrum belongs to
    pub obj_id: String,
    /// When the spectrum was observed
    pub observed_at: DateTime<Utc>,
    /// Wavelength grid
    pub wavelengths: Vec<f64>,
    /// Flux at each wavelength
    pub fluxes: Vec<f64>,
    /// Per-point flux uncertainty
    pub errors: Option<Vec<f64>>,
    /// Instrument that took the spectrum
    pub instrument_id: Option<String>,
    /// User who uploaded the spectrum
    pub owner_id: String,
    /// Groups the spectrum is visible to
    pub group_ids: BTreeSet<String>,
    /// When the spectrum was uploaded
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredSpectrum {
    const KIND: &'static str = "spectrum";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn owner_user_id(&self) -> &str {
        &self.owner_id
    }
}

impl GroupScoped for StoredSpectrum {
    fn group_ids(&self) -> &BTreeSet<String> {
        &self.group_ids
    }
}

impl Record for StoredSpectrum {
    const COLLECTION: &'static str = "spectra";
    const LABEL: &'static str = "Spectrum";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for spectrum records.
pub type SpectrumRepository<'a> = Repository<'a, StoredSpectrum>;
