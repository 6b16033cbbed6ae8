// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Backends that perform no security at all. Use at your own risk.

use std::collections::BTreeSet;

use crate::{
	authorizations::Authorizations,
	constants::NULL_TOKEN,
	credential::{Credential, Token},
	error::HandlerError,
	handler::{Authenticator, Authorizor, PermissionHandler},
	permission::{SystemPermission, TablePermission},
};

pub const INSECURE: &str = "insecure";

/// Authenticates everyone and tracks no users.
#[derive(Debug, Default)]
pub struct InsecureAuthenticator;

impl Authenticator for InsecureAuthenticator {
	fn name(&self) -> &'static str {
		INSECURE
	}

	fn initialize(&self, _instance_id: &str, _initialize: bool) -> Result<(), HandlerError> {
		Ok(())
	}

	fn valid_security_handlers(&self, _authorizor: &dyn Authorizor, _permissions: &dyn PermissionHandler) -> bool {
		true
	}

	fn initialize_security(&self, _credentials: &Credential, _root: &str, _token: &[u8]) -> Result<(), HandlerError> {
		Ok(())
	}

	fn authenticate_user(&self, _principal: &str, _token: &Token) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn list_users(&self) -> Result<BTreeSet<String>, HandlerError> {
		Ok(BTreeSet::new())
	}

	fn create_user(&self, _principal: &str, _token: &Token) -> Result<(), HandlerError> {
		Ok(())
	}

	fn drop_user(&self, _principal: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn change_password(&self, _principal: &str, _token: &Token) -> Result<(), HandlerError> {
		Ok(())
	}

	fn user_exists(&self, _principal: &str) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn valid_token_kind(&self, kind: &str) -> bool {
		kind == NULL_TOKEN
	}

	fn token_login_kind(&self) -> Option<&'static str> {
		None
	}
}

/// Every user holds the empty label set; changes are discarded.
#[derive(Debug, Default)]
pub struct InsecureAuthorizor;

impl Authorizor for InsecureAuthorizor {
	fn name(&self) -> &'static str {
		INSECURE
	}

	fn initialize(&self, _instance_id: &str, _initialize: bool) -> Result<(), HandlerError> {
		Ok(())
	}

	fn valid_security_handlers(
		&self,
		_authenticator: &dyn Authenticator,
		_permissions: &dyn PermissionHandler,
	) -> bool {
		true
	}

	fn initialize_security(&self, _credentials: &Credential, _root: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn get_cached_user_authorizations(&self, _principal: &str) -> Result<Authorizations, HandlerError> {
		Ok(Authorizations::empty())
	}

	fn change_authorizations(&self, _principal: &str, _authorizations: &Authorizations) -> Result<(), HandlerError> {
		Ok(())
	}

	fn init_user(&self, _principal: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn drop_user(&self, _principal: &str) -> Result<(), HandlerError> {
		Ok(())
	}
}

/// Every user holds every permission; grants and revocations are discarded.
#[derive(Debug, Default)]
pub struct InsecurePermissionHandler;

impl PermissionHandler for InsecurePermissionHandler {
	fn name(&self) -> &'static str {
		INSECURE
	}

	fn initialize(&self, _instance_id: &str, _initialize: bool) -> Result<(), HandlerError> {
		Ok(())
	}

	fn valid_security_handlers(&self, _authenticator: &dyn Authenticator, _authorizor: &dyn Authorizor) -> bool {
		true
	}

	fn initialize_security(&self, _credentials: &Credential, _root: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn has_system_permission(&self, _principal: &str, _permission: SystemPermission) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn has_cached_system_permission(
		&self,
		_principal: &str,
		_permission: SystemPermission,
	) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn has_table_permission(
		&self,
		_principal: &str,
		_table_id: &str,
		_permission: TablePermission,
	) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn has_cached_table_permission(
		&self,
		_principal: &str,
		_table_id: &str,
		_permission: TablePermission,
	) -> Result<bool, HandlerError> {
		Ok(true)
	}

	fn grant_system_permission(&self, _principal: &str, _permission: SystemPermission) -> Result<(), HandlerError> {
		Ok(())
	}

	fn revoke_system_permission(&self, _principal: &str, _permission: SystemPermission) -> Result<(), HandlerError> {
		Ok(())
	}

	fn grant_table_permission(
		&self,
		_principal: &str,
		_table_id: &str,
		_permission: TablePermission,
	) -> Result<(), HandlerError> {
		Ok(())
	}

	fn revoke_table_permission(
		&self,
		_principal: &str,
		_table_id: &str,
		_permission: TablePermission,
	) -> Result<(), HandlerError> {
		Ok(())
	}

	fn clean_table_permissions(&self, _table_id: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn init_user(&self, _principal: &str) -> Result<(), HandlerError> {
		Ok(())
	}

	fn clean_user(&self, _principal: &str) -> Result<(), HandlerError> {
		Ok(())
	}
}
