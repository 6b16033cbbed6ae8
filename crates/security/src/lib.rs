// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Authorization core of ReifyDB.
//!
//! Every privileged operation (user lifecycle, permission grants, table
//! reads/writes/alters, bulk loads) is evaluated by the [`SecurityEngine`]
//! before it runs. The engine combines three pluggable backends:
//!
//! - an [`Authenticator`] that validates principal/token pairs,
//! - an [`Authorizor`] that stores record-level authorization labels,
//! - a [`PermissionHandler`] that stores system and per-table grants.
//!
//! Backends are selected by name through the [`HandlerRegistry`] once at
//! startup and must agree that they can work together.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod audit;
pub mod authorizations;
pub mod config;
pub mod constants;
pub mod coordination;
pub mod credential;
pub mod engine;
pub mod error;
pub mod handler;
pub mod permission;
pub mod registry;
pub mod test_utils;

pub use authorizations::Authorizations;
pub use config::{Property, SecurityConfig, SiteConfiguration};
pub use coordination::{Coordination, MemoryCoordination};
pub use credential::{Credential, SystemCredentials, Token};
pub use engine::SecurityEngine;
pub use error::{BuildError, HandlerError, SecurityError, SecurityErrorCode};
pub use handler::{Authenticator, Authorizor, PermissionHandler};
pub use permission::{SystemPermission, TablePermission};
pub use registry::{HandlerContext, HandlerRegistry};

pub type Result<T> = std::result::Result<T, SecurityError>;
