// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Client-facing RPC surface of the security layer.
//!
//! [`ClientService`] translates wire requests (permission ids as bytes,
//! tables by name) into calls on the [`SecurityEngine`] and converts every
//! failure into a [`WireError`].
//!
//! [`SecurityEngine`]: reifydb_security::SecurityEngine

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod bulk;
pub mod config;
pub mod error;
pub mod service;
pub mod table;

pub use bulk::BulkImporter;
pub use config::{ConfigurationSource, ConfigurationType, StaticConfiguration, redact};
pub use error::{ServiceError, TableOperation, TableOperationErrorKind, WireError};
pub use service::{ClientService, InstanceDescriptor};
pub use table::{CoordinatedTableCatalog, TableCatalog};

pub type Result<T> = std::result::Result<T, ServiceError>;
