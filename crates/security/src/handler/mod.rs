// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Pluggable backend contracts.
//!
//! Each capability set can be swapped independently, but the three selected
//! implementations must accept each other through
//! `valid_security_handlers` before the engine is usable.

use std::collections::BTreeSet;

use crate::{
	authorizations::Authorizations,
	credential::{Credential, Token},
	error::HandlerError,
	permission::{SystemPermission, TablePermission},
};

pub mod coordinated;
pub mod insecure;

pub use coordinated::{CoordinatedAuthenticator, CoordinatedAuthorizor, CoordinatedPermissionHandler};
pub use insecure::{InsecureAuthenticator, InsecureAuthorizor, InsecurePermissionHandler};

/// Validates principal/token pairs and owns the user credential lifecycle.
pub trait Authenticator: Send + Sync {
	/// Name the backend is registered under.
	fn name(&self) -> &'static str;

	/// Called once after construction.
	fn initialize(&self, instance_id: &str, initialize: bool) -> Result<(), HandlerError>;

	fn valid_security_handlers(&self, authorizor: &dyn Authorizor, permissions: &dyn PermissionHandler) -> bool;

	/// First-time setup for the root principal.
	fn initialize_security(&self, credentials: &Credential, root: &str, token: &[u8]) -> Result<(), HandlerError>;

	fn authenticate_user(&self, principal: &str, token: &Token) -> Result<bool, HandlerError>;

	fn list_users(&self) -> Result<BTreeSet<String>, HandlerError>;

	fn create_user(&self, principal: &str, token: &Token) -> Result<(), HandlerError>;

	fn drop_user(&self, principal: &str) -> Result<(), HandlerError>;

	fn change_password(&self, principal: &str, token: &Token) -> Result<(), HandlerError>;

	fn user_exists(&self, principal: &str) -> Result<bool, HandlerError>;

	/// Whether tokens of `kind` can be turned into a [`Token`] by this backend.
	fn valid_token_kind(&self, kind: &str) -> bool;

	/// Token kind clients should log in with, if the backend has one.
	fn token_login_kind(&self) -> Option<&'static str>;
}

/// Stores the record-level authorization labels of each user.
pub trait Authorizor: Send + Sync {
	fn name(&self) -> &'static str;

	fn initialize(&self, instance_id: &str, initialize: bool) -> Result<(), HandlerError>;

	fn valid_security_handlers(&self, authenticator: &dyn Authenticator, permissions: &dyn PermissionHandler)
	-> bool;

	fn initialize_security(&self, credentials: &Credential, root: &str) -> Result<(), HandlerError>;

	fn get_cached_user_authorizations(&self, principal: &str) -> Result<Authorizations, HandlerError>;

	fn change_authorizations(&self, principal: &str, authorizations: &Authorizations) -> Result<(), HandlerError>;

	fn init_user(&self, principal: &str) -> Result<(), HandlerError>;

	fn drop_user(&self, principal: &str) -> Result<(), HandlerError>;
}

/// Stores system-level and per-table permission grants.
///
/// Table-scoped calls report unknown table ids as
/// [`HandlerError::TableNotFound`].
pub trait PermissionHandler: Send + Sync {
	fn name(&self) -> &'static str;

	fn initialize(&self, instance_id: &str, initialize: bool) -> Result<(), HandlerError>;

	fn valid_security_handlers(&self, authenticator: &dyn Authenticator, authorizor: &dyn Authorizor) -> bool;

	fn initialize_security(&self, credentials: &Credential, root: &str) -> Result<(), HandlerError>;

	fn has_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<bool, HandlerError>;

	/// May answer from a locally held snapshot.
	fn has_cached_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> Result<bool, HandlerError>;

	fn has_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<bool, HandlerError>;

	/// May answer from a locally held snapshot.
	fn has_cached_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<bool, HandlerError>;

	fn grant_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<(), HandlerError>;

	fn revoke_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<(), HandlerError>;

	fn grant_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<(), HandlerError>;

	fn revoke_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<(), HandlerError>;

	/// Removes every grant on `table_id`, for all users.
	fn clean_table_permissions(&self, table_id: &str) -> Result<(), HandlerError>;

	fn init_user(&self, principal: &str) -> Result<(), HandlerError>;

	/// Removes every grant held by `principal`.
	fn clean_user(&self, principal: &str) -> Result<(), HandlerError>;
}
