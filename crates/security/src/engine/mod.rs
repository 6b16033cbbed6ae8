// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The security engine: authenticates callers, evaluates every privileged
//! operation against the configured backends and applies the resulting
//! mutations.
//!
//! Two principals are special-cased. The system principal is used for calls
//! between servers of one instance and is exempt from permission checks. The
//! root principal is the bootstrap administrator; it holds every system
//! permission and can neither be dropped nor lose system permissions.

mod check;
mod mutate;

use std::{collections::BTreeSet, fmt::Display, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::{
	audit,
	authorizations::Authorizations,
	config::SecurityConfig,
	constants::{METADATA_TABLE_ID, SYSTEM_PRINCIPAL},
	coordination::{Coordination, paths},
	credential::{Credential, SystemCredentials, Token},
	error::{BuildError, HandlerError, SecurityError, SecurityErrorCode},
	handler::{Authenticator, Authorizor, PermissionHandler},
	permission::{SystemPermission, TablePermission},
	registry::{HandlerRegistry, Handlers},
};

pub struct SecurityEngine {
	instance_id: String,
	system: SystemCredentials,
	authenticator: Box<dyn Authenticator>,
	authorizor: Box<dyn Authorizor>,
	permissions: Box<dyn PermissionHandler>,
	coordination: Arc<dyn Coordination>,
	root: Mutex<Option<String>>,
}

impl SecurityEngine {
	/// Resolve the configured backends and assemble the engine.
	pub fn build(
		config: &SecurityConfig,
		registry: &HandlerRegistry,
		coordination: Arc<dyn Coordination>,
	) -> Result<Self, BuildError> {
		let handlers = registry.resolve(config, coordination.clone())?;
		let system = SystemCredentials::derive(&config.instance_id, &config.secret)?;
		Self::new(config.instance_id.clone(), system, handlers, coordination)
	}

	/// Assemble the engine from already constructed backends. Fails if any
	/// backend refuses to work with the other two.
	pub fn new(
		instance_id: impl Into<String>,
		system: SystemCredentials,
		handlers: Handlers,
		coordination: Arc<dyn Coordination>,
	) -> Result<Self, BuildError> {
		let Handlers {
			authenticator,
			authorizor,
			permissions,
		} = handlers;

		if !authorizor.valid_security_handlers(authenticator.as_ref(), permissions.as_ref())
			|| !authenticator.valid_security_handlers(authorizor.as_ref(), permissions.as_ref())
			|| !permissions.valid_security_handlers(authenticator.as_ref(), authorizor.as_ref())
		{
			return Err(BuildError::IncompatibleHandlers {
				authenticator: authenticator.name().to_string(),
				authorizor: authorizor.name().to_string(),
				permission_handler: permissions.name().to_string(),
			});
		}

		Ok(Self {
			instance_id: instance_id.into(),
			system,
			authenticator,
			authorizor,
			permissions,
			coordination,
			root: Mutex::new(None),
		})
	}

	pub fn instance_id(&self) -> &str {
		&self.instance_id
	}

	pub fn system_credentials(&self) -> &SystemCredentials {
		&self.system
	}

	/// Token kind clients should log in with, if the authenticator has one.
	pub fn token_login_kind(&self) -> Option<&'static str> {
		self.authenticator.token_login_kind()
	}

	/// Name of the root principal, once the instance has been bootstrapped.
	pub fn root_username(&self) -> crate::Result<Option<String>> {
		self.root().map_err(|e| e.into_security(SYSTEM_PRINCIPAL))
	}

	fn root(&self) -> Result<Option<String>, HandlerError> {
		let mut root = self.root.lock();
		if root.is_none() {
			if let Some(data) = self.coordination.get(&paths::root_user(&self.instance_id))? {
				let name = String::from_utf8(data)
					.map_err(|_| HandlerError::Internal("root principal marker is not utf-8".to_string()))?;
				debug!(root = %name, "resolved root principal");
				*root = Some(name);
			}
		}
		Ok(root.clone())
	}

	fn is_root(&self, user: &str, acting: &str) -> crate::Result<bool> {
		let root = self.root().map_err(|e| e.into_security(acting))?;
		Ok(root.as_deref() == Some(user))
	}

	/// Verify that `credentials` identify a real caller of this instance.
	#[instrument(name = "security::authenticate", level = "trace", skip(self, credentials))]
	pub fn authenticate(&self, credentials: &Credential) -> crate::Result<()> {
		let result = self.verify(credentials);
		if let Err(err) = &result {
			audit::failure(credentials.principal(), "authenticate", &self.instance_id, err);
		}
		result
	}

	fn verify(&self, credentials: &Credential) -> crate::Result<()> {
		let principal = credentials.principal();
		if credentials.instance_id() != self.instance_id {
			return Err(SecurityError::new(principal, SecurityErrorCode::InvalidInstanceid));
		}

		if self.system.matches(credentials) {
			return Ok(());
		}
		if principal == SYSTEM_PRINCIPAL {
			return Err(SecurityError::new(principal, SecurityErrorCode::BadCredentials));
		}

		let token = self.reassemble_token(credentials)?;
		let authenticated =
			self.authenticator.authenticate_user(principal, &token).map_err(|e| e.into_security(principal))?;
		if !authenticated {
			return Err(SecurityError::new(principal, SecurityErrorCode::BadCredentials));
		}
		Ok(())
	}

	fn reassemble_token(&self, credentials: &Credential) -> crate::Result<Token> {
		if !self.authenticator.valid_token_kind(credentials.token_kind()) {
			return Err(SecurityError::new(credentials.principal(), SecurityErrorCode::InvalidToken));
		}
		Token::from_credential(credentials)
			.ok_or_else(|| SecurityError::new(credentials.principal(), SecurityErrorCode::InvalidToken))
	}

	fn target_user_exists(&self, user: &str) -> crate::Result<()> {
		if user == SYSTEM_PRINCIPAL || self.is_root(user, user)? {
			return Ok(());
		}
		if !self.authenticator.user_exists(user).map_err(|e| e.into_security(user))? {
			return Err(SecurityError::new(user, SecurityErrorCode::UserDoesntExist));
		}
		Ok(())
	}

	fn system_permission(&self, user: &str, permission: SystemPermission, cached: bool) -> crate::Result<bool> {
		if user == SYSTEM_PRINCIPAL || self.is_root(user, user)? {
			return Ok(true);
		}

		self.target_user_exists(user)?;

		let result = if cached {
			self.permissions.has_cached_system_permission(user, permission)
		} else {
			self.permissions.has_system_permission(user, permission)
		};
		result.map_err(|e| e.into_security(user))
	}

	fn table_permission(
		&self,
		user: &str,
		table_id: &str,
		permission: TablePermission,
		cached: bool,
	) -> crate::Result<bool> {
		if user == SYSTEM_PRINCIPAL {
			return Ok(true);
		}

		self.target_user_exists(user)?;

		if table_id == METADATA_TABLE_ID && permission == TablePermission::Read {
			return Ok(true);
		}

		let result = if cached {
			self.permissions.has_cached_table_permission(user, table_id, permission)
		} else {
			self.permissions.has_table_permission(user, table_id, permission)
		};
		result.map_err(|e| e.into_security(user))
	}

	/// Authenticate, evaluate `check` for the caller and audit the decision.
	fn evaluate(
		&self,
		credentials: &Credential,
		action: &str,
		detail: impl Display,
		check: impl FnOnce(&str) -> crate::Result<bool>,
	) -> crate::Result<bool> {
		let principal = credentials.principal();
		let result = self.verify(credentials).and_then(|_| check(principal));
		audit::check(principal, action, detail, &result);
		result
	}

	/// Run a mutating operation on behalf of the caller and audit it.
	fn perform<T>(
		&self,
		credentials: &Credential,
		action: &str,
		detail: impl Display,
		operation: impl FnOnce(&str) -> crate::Result<T>,
	) -> crate::Result<T> {
		let principal = credentials.principal();
		let result = operation(principal);
		audit::operation(principal, action, detail, &result);
		result
	}

	/// Bootstrap the instance: each backend performs first-time setup for
	/// `root`, which then also receives ALTER_TABLE on the metadata table.
	/// Only the system principal may call this.
	#[instrument(name = "security::initialize_security", level = "debug", skip(self, credentials, token))]
	pub fn initialize_security(&self, credentials: &Credential, root: &str, token: &[u8]) -> crate::Result<()> {
		self.perform(credentials, "initialize_security", root, |principal| {
			self.verify(credentials)?;
			if principal != SYSTEM_PRINCIPAL {
				return Err(SecurityError::permission_denied(principal));
			}

			let backend = |e: HandlerError| e.into_security(principal);
			self.authenticator.initialize_security(credentials, root, token).map_err(backend)?;
			self.authorizor.initialize_security(credentials, root).map_err(backend)?;
			self.permissions.initialize_security(credentials, root).map_err(backend)?;

			self.coordination
				.put(&paths::root_user(&self.instance_id), root.as_bytes().to_vec())
				.map_err(backend)?;
			*self.root.lock() = Some(root.to_string());

			self.permissions
				.grant_table_permission(root, METADATA_TABLE_ID, TablePermission::AlterTable)
				.map_err(backend)
		})
	}

	/// Whether `to_auth` is a valid credential. Callers may only ask about
	/// themselves unless they can perform system actions.
	#[instrument(name = "security::authenticate_user", level = "trace", skip(self, credentials, to_auth))]
	pub fn authenticate_user(&self, credentials: &Credential, to_auth: &Credential) -> crate::Result<bool> {
		self.can_ask_about_user(credentials, to_auth.principal())?;
		if credentials == to_auth {
			return Ok(true);
		}

		let token = self.reassemble_token(to_auth)?;
		self.authenticator
			.authenticate_user(to_auth.principal(), &token)
			.map_err(|e| e.into_security(credentials.principal()))
	}

	#[instrument(name = "security::get_user_authorizations", level = "trace", skip(self, credentials))]
	pub fn get_user_authorizations(&self, credentials: &Credential, user: &str) -> crate::Result<Authorizations> {
		let result = self.user_authorizations(credentials, user);
		if let Err(err) = &result {
			audit::failure(credentials.principal(), "get_user_authorizations", user, err);
		}
		result
	}

	fn user_authorizations(&self, credentials: &Credential, user: &str) -> crate::Result<Authorizations> {
		let principal = credentials.principal();
		self.verify(credentials)?;
		self.target_user_exists(user)?;

		if principal != user && !self.system_permission(principal, SystemPermission::System, false)? {
			return Err(SecurityError::permission_denied(principal));
		}

		// system principal needs no record-level labels
		if user == SYSTEM_PRINCIPAL {
			return Ok(Authorizations::empty());
		}

		self.authorizor.get_cached_user_authorizations(user).map_err(|e| e.into_security(principal))
	}

	/// Authorizations of the caller itself.
	pub fn get_authorizations(&self, credentials: &Credential) -> crate::Result<Authorizations> {
		self.get_user_authorizations(credentials, credentials.principal())
	}

	/// Fresh system permission lookup for `user`, on behalf of the caller.
	#[instrument(name = "security::has_system_permission", level = "trace", skip(self, credentials))]
	pub fn has_system_permission(
		&self,
		credentials: &Credential,
		user: &str,
		permission: SystemPermission,
	) -> crate::Result<bool> {
		if !self.can_ask_about_other_users(credentials, user)? {
			return Err(SecurityError::permission_denied(credentials.principal()));
		}
		self.system_permission(user, permission, false)
	}

	/// Fresh table permission lookup for `user`, on behalf of the caller.
	#[instrument(name = "security::has_table_permission", level = "trace", skip(self, credentials))]
	pub fn has_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_id: &str,
		permission: TablePermission,
	) -> crate::Result<bool> {
		if !self.can_ask_about_other_users(credentials, user)? {
			return Err(SecurityError::permission_denied(credentials.principal()));
		}
		self.table_permission(user, table_id, permission, false)
	}

	#[instrument(name = "security::list_users", level = "trace", skip(self, credentials))]
	pub fn list_users(&self, credentials: &Credential) -> crate::Result<BTreeSet<String>> {
		self.authenticate(credentials)?;
		self.authenticator.list_users().map_err(|e| e.into_security(credentials.principal()))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::{
		coordination::MemoryCoordination,
		test_utils::{TEST_INSTANCE, test_config},
	};

	fn engine(coordination: Arc<MemoryCoordination>) -> SecurityEngine {
		SecurityEngine::build(&test_config(), &HandlerRegistry::with_defaults(), coordination).unwrap()
	}

	#[test]
	fn test_root_is_unknown_before_bootstrap() {
		let engine = engine(Arc::new(MemoryCoordination::new()));
		assert_eq!(engine.root_username().unwrap(), None);
	}

	#[test]
	fn test_root_is_memoized_once_found() {
		let coordination = Arc::new(MemoryCoordination::new());
		let engine = engine(coordination.clone());
		assert_eq!(engine.root_username().unwrap(), None);

		coordination.put(&paths::root_user(TEST_INSTANCE), b"admin".to_vec()).unwrap();
		assert_eq!(engine.root_username().unwrap().as_deref(), Some("admin"));

		coordination.put(&paths::root_user(TEST_INSTANCE), b"other".to_vec()).unwrap();
		coordination.set_available(false);
		assert_eq!(engine.root_username().unwrap().as_deref(), Some("admin"));
	}

	#[test]
	fn test_incompatible_handlers_fail_construction() {
		let config = test_config().authenticator("insecure");
		let coordination = Arc::new(MemoryCoordination::new());
		match SecurityEngine::build(&config, &HandlerRegistry::with_defaults(), coordination) {
			Err(BuildError::IncompatibleHandlers {
				authenticator,
				authorizor,
				permission_handler,
			}) => {
				assert_eq!(authenticator, "insecure");
				assert_eq!(authorizor, "coordinated");
				assert_eq!(permission_handler, "coordinated");
			}
			Err(err) => panic!("unexpected error: {}", err),
			Ok(_) => panic!("incompatible handlers were accepted"),
		}
	}
}
