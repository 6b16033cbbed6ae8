// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Operations that change security state.
//!
//! Each operation checks its predicate first and touches no backend when it
//! is denied. Multi-backend operations are not transactional: a failure part
//! way leaves the earlier steps applied, and repeating the operation
//! converges because every backend step is create-if-absent or
//! delete-if-present.

use tracing::instrument;

use crate::{
	authorizations::Authorizations,
	credential::Credential,
	engine::SecurityEngine,
	error::{HandlerError, SecurityError},
	permission::{SystemPermission, TablePermission},
};

impl SecurityEngine {
	#[instrument(name = "security::change_authorizations", level = "debug", skip(self, credentials, authorizations))]
	pub fn change_authorizations(
		&self,
		credentials: &Credential,
		user: &str,
		authorizations: &Authorizations,
	) -> crate::Result<()> {
		self.perform(credentials, "change_authorizations", user, |caller| {
			if !self.can_change_authorizations(credentials, user)? {
				return Err(SecurityError::permission_denied(caller));
			}
			self.target_user_exists(user)?;
			self.authorizor.change_authorizations(user, authorizations).map_err(|e| e.into_security(caller))
		})
	}

	#[instrument(name = "security::change_password", level = "debug", skip(self, credentials, to_change))]
	pub fn change_password(&self, credentials: &Credential, to_change: &Credential) -> crate::Result<()> {
		self.perform(credentials, "change_password", to_change.principal(), |caller| {
			if !self.can_change_password(credentials, to_change.principal())? {
				return Err(SecurityError::permission_denied(caller));
			}
			let token = self.reassemble_token(to_change)?;
			self.authenticator
				.change_password(to_change.principal(), &token)
				.map_err(|e| e.into_security(caller))
		})
	}

	/// Create `new_user` in all three backends. The initial authorizations
	/// are only applied if the caller may also change authorizations;
	/// otherwise the user starts with none.
	#[instrument(name = "security::create_user", level = "debug", skip(self, credentials, new_user, authorizations))]
	pub fn create_user(
		&self,
		credentials: &Credential,
		new_user: &Credential,
		authorizations: &Authorizations,
	) -> crate::Result<()> {
		let user = new_user.principal();
		self.perform(credentials, "create_user", user, |caller| {
			if !self.can_create_user(credentials, user)? {
				return Err(SecurityError::permission_denied(caller));
			}
			let token = self.reassemble_token(new_user)?;
			let backend = |e: HandlerError| e.into_security(caller);

			self.authenticator.create_user(user, &token).map_err(backend)?;
			self.authorizor.init_user(user).map_err(backend)?;
			self.permissions.init_user(user).map_err(backend)?;

			if self.can_change_authorizations(credentials, user)? {
				self.authorizor.change_authorizations(user, authorizations).map_err(backend)?;
			}
			Ok(())
		})
	}

	#[instrument(name = "security::drop_user", level = "debug", skip(self, credentials))]
	pub fn drop_user(&self, credentials: &Credential, user: &str) -> crate::Result<()> {
		self.perform(credentials, "drop_user", user, |caller| {
			if !self.can_drop_user(credentials, user)? {
				return Err(SecurityError::permission_denied(caller));
			}
			let backend = |e: HandlerError| e.into_security(caller);

			self.authorizor.drop_user(user).map_err(backend)?;
			self.authenticator.drop_user(user).map_err(backend)?;
			self.permissions.clean_user(user).map_err(backend)
		})
	}

	#[instrument(name = "security::grant_system_permission", level = "debug", skip(self, credentials))]
	pub fn grant_system_permission(
		&self,
		credentials: &Credential,
		user: &str,
		permission: SystemPermission,
	) -> crate::Result<()> {
		self.perform(credentials, "grant_system_permission", format_args!("{} to {}", permission, user), |caller| {
			if !self.can_grant_system(credentials, user, permission)? {
				return Err(SecurityError::permission_denied(caller));
			}
			self.target_user_exists(user)?;
			self.permissions.grant_system_permission(user, permission).map_err(|e| e.into_security(caller))
		})
	}

	#[instrument(name = "security::grant_table_permission", level = "debug", skip(self, credentials))]
	pub fn grant_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_id: &str,
		permission: TablePermission,
	) -> crate::Result<()> {
		self.perform(
			credentials,
			"grant_table_permission",
			format_args!("{} to {} on {}", permission, user, table_id),
			|caller| {
				if !self.can_grant_table(credentials, user, table_id)? {
					return Err(SecurityError::permission_denied(caller));
				}
				self.target_user_exists(user)?;
				self.permissions
					.grant_table_permission(user, table_id, permission)
					.map_err(|e| e.into_security(caller))
			},
		)
	}

	#[instrument(name = "security::revoke_system_permission", level = "debug", skip(self, credentials))]
	pub fn revoke_system_permission(
		&self,
		credentials: &Credential,
		user: &str,
		permission: SystemPermission,
	) -> crate::Result<()> {
		self.perform(credentials, "revoke_system_permission", format_args!("{} from {}", permission, user), |caller| {
			if !self.can_revoke_system(credentials, user, permission)? {
				return Err(SecurityError::permission_denied(caller));
			}
			self.target_user_exists(user)?;
			self.permissions.revoke_system_permission(user, permission).map_err(|e| e.into_security(caller))
		})
	}

	#[instrument(name = "security::revoke_table_permission", level = "debug", skip(self, credentials))]
	pub fn revoke_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_id: &str,
		permission: TablePermission,
	) -> crate::Result<()> {
		self.perform(
			credentials,
			"revoke_table_permission",
			format_args!("{} from {} on {}", permission, user, table_id),
			|caller| {
				if !self.can_revoke_table(credentials, user, table_id)? {
					return Err(SecurityError::permission_denied(caller));
				}
				self.target_user_exists(user)?;
				self.permissions
					.revoke_table_permission(user, table_id, permission)
					.map_err(|e| e.into_security(caller))
			},
		)
	}

	/// Remove every grant on a table that is being deleted.
	#[instrument(name = "security::delete_table", level = "debug", skip(self, credentials))]
	pub fn delete_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<()> {
		self.perform(credentials, "delete_table", table_id, |caller| {
			if !self.can_delete_table(credentials, table_id)? {
				return Err(SecurityError::permission_denied(caller));
			}
			self.permissions.clean_table_permissions(table_id).map_err(|e| e.attribute_to(caller))
		})
	}
}
