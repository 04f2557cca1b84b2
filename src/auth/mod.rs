// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token authentication for the SkyShare API.
//!
//! ## Auth Flow
//!
//! 1. An external issuer signs a JWT whose `sub` is a registered user ID
//! 2. Clients send `Authorization: Bearer <JWT>` (or `token <JWT>`)
//! 3. The server:
//!    - Verifies the HS256 signature, expiry and issuer
//!    - Loads the user record named by `sub`
//!    - Resolves the groups the user is a member of
//!
//! ACLs and memberships come from storage on every request, never from
//! token claims. Clock skew tolerance is 60 seconds.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{Auth, SystemAdminOnly};
pub use roles::{Acl, Role};
