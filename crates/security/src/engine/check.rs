// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Permission predicates, one per privileged operation.
//!
//! Predicates authenticate the caller first and never mutate state. Checks on
//! the hot data path (scan, write) accept cached answers; everything else
//! reads fresh state.

use tracing::instrument;

use crate::{
	audit,
	constants::SYSTEM_PRINCIPAL,
	credential::Credential,
	engine::SecurityEngine,
	error::{SecurityError, SecurityErrorCode},
	permission::{SystemPermission, TablePermission},
};

impl SecurityEngine {
	#[instrument(name = "security::can_scan", level = "trace", skip(self, credentials))]
	pub fn can_scan(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "scan", table_id, |user| {
			self.table_permission(user, table_id, TablePermission::Read, true)
		})
	}

	#[instrument(name = "security::can_write", level = "trace", skip(self, credentials))]
	pub fn can_write(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "write", table_id, |user| {
			self.table_permission(user, table_id, TablePermission::Write, true)
		})
	}

	#[instrument(name = "security::can_split_tablet", level = "trace", skip(self, credentials))]
	pub fn can_split_tablet(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "split_tablet", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::AlterTable, false)?
				|| self.system_permission(user, SystemPermission::System, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?)
		})
	}

	/// Loading tablets, shutting down servers and altering system properties.
	#[instrument(name = "security::can_perform_system_actions", level = "trace", skip(self, credentials))]
	pub fn can_perform_system_actions(&self, credentials: &Credential) -> crate::Result<bool> {
		self.evaluate(credentials, "system_actions", "", |user| {
			self.system_permission(user, SystemPermission::System, false)
		})
	}

	#[instrument(name = "security::can_flush", level = "trace", skip(self, credentials))]
	pub fn can_flush(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "flush", table_id, |user| {
			Ok(self.table_permission(user, table_id, TablePermission::Write, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?)
		})
	}

	#[instrument(name = "security::can_alter_table", level = "trace", skip(self, credentials))]
	pub fn can_alter_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "alter_table", table_id, |user| {
			Ok(self.table_permission(user, table_id, TablePermission::AlterTable, false)?
				|| self.system_permission(user, SystemPermission::AlterTable, false)?)
		})
	}

	#[instrument(name = "security::can_create_table", level = "trace", skip(self, credentials))]
	pub fn can_create_table(&self, credentials: &Credential) -> crate::Result<bool> {
		self.evaluate(credentials, "create_table", "", |user| {
			self.system_permission(user, SystemPermission::CreateTable, false)
		})
	}

	#[instrument(name = "security::can_rename_table", level = "trace", skip(self, credentials))]
	pub fn can_rename_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "rename_table", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::AlterTable, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?)
		})
	}

	/// Cloning needs both the right to create tables and the right to read
	/// the source.
	#[instrument(name = "security::can_clone_table", level = "trace", skip(self, credentials))]
	pub fn can_clone_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "clone_table", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::CreateTable, false)?
				&& self.table_permission(user, table_id, TablePermission::Read, false)?)
		})
	}

	#[instrument(name = "security::can_delete_table", level = "trace", skip(self, credentials))]
	pub fn can_delete_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "delete_table", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::DropTable, false)?
				|| self.table_permission(user, table_id, TablePermission::DropTable, false)?)
		})
	}

	#[instrument(name = "security::can_online_offline_table", level = "trace", skip(self, credentials))]
	pub fn can_online_offline_table(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "online_offline_table", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::System, false)?
				|| self.system_permission(user, SystemPermission::AlterTable, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?)
		})
	}

	#[instrument(name = "security::can_merge", level = "trace", skip(self, credentials))]
	pub fn can_merge(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "merge", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::System, false)?
				|| self.system_permission(user, SystemPermission::AlterTable, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?)
		})
	}

	#[instrument(name = "security::can_delete_range", level = "trace", skip(self, credentials))]
	pub fn can_delete_range(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "delete_range", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::System, false)?
				|| self.table_permission(user, table_id, TablePermission::Write, false)?)
		})
	}

	#[instrument(name = "security::can_bulk_import", level = "trace", skip(self, credentials))]
	pub fn can_bulk_import(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "bulk_import", table_id, |user| {
			self.table_permission(user, table_id, TablePermission::BulkImport, false)
		})
	}

	#[instrument(name = "security::can_compact", level = "trace", skip(self, credentials))]
	pub fn can_compact(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "compact", table_id, |user| {
			Ok(self.system_permission(user, SystemPermission::AlterTable, false)?
				|| self.table_permission(user, table_id, TablePermission::AlterTable, false)?
				|| self.table_permission(user, table_id, TablePermission::Write, false)?)
		})
	}

	#[instrument(name = "security::can_change_authorizations", level = "trace", skip(self, credentials))]
	pub fn can_change_authorizations(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "change_authorizations", user, |caller| {
			forbid_system_target(caller, user)?;
			self.system_permission(caller, SystemPermission::AlterUser, false)
		})
	}

	#[instrument(name = "security::can_change_password", level = "trace", skip(self, credentials))]
	pub fn can_change_password(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "change_password", user, |caller| {
			forbid_system_target(caller, user)?;
			Ok(caller == user || self.system_permission(caller, SystemPermission::AlterUser, false)?)
		})
	}

	#[instrument(name = "security::can_create_user", level = "trace", skip(self, credentials))]
	pub fn can_create_user(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "create_user", user, |caller| {
			forbid_system_target(caller, user)?;
			self.system_permission(caller, SystemPermission::CreateUser, false)
		})
	}

	#[instrument(name = "security::can_drop_user", level = "trace", skip(self, credentials))]
	pub fn can_drop_user(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "drop_user", user, |caller| {
			self.forbid_root_target(caller, user)?;
			forbid_system_target(caller, user)?;
			self.system_permission(caller, SystemPermission::DropUser, false)
		})
	}

	#[instrument(name = "security::can_grant_system", level = "trace", skip(self, credentials))]
	pub fn can_grant_system(
		&self,
		credentials: &Credential,
		user: &str,
		permission: SystemPermission,
	) -> crate::Result<bool> {
		self.evaluate(credentials, "grant_system", format_args!("{} to {}", permission, user), |caller| {
			forbid_system_target(caller, user)?;
			forbid_grant(caller, permission)?;
			self.system_permission(caller, SystemPermission::Grant, false)
		})
	}

	#[instrument(name = "security::can_grant_table", level = "trace", skip(self, credentials))]
	pub fn can_grant_table(&self, credentials: &Credential, user: &str, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "grant_table", format_args!("{} on {}", user, table_id), |caller| {
			forbid_system_target(caller, user)?;
			Ok(self.system_permission(caller, SystemPermission::AlterTable, false)?
				|| self.table_permission(caller, table_id, TablePermission::Grant, false)?)
		})
	}

	#[instrument(name = "security::can_revoke_system", level = "trace", skip(self, credentials))]
	pub fn can_revoke_system(
		&self,
		credentials: &Credential,
		user: &str,
		permission: SystemPermission,
	) -> crate::Result<bool> {
		self.evaluate(credentials, "revoke_system", format_args!("{} from {}", permission, user), |caller| {
			self.forbid_root_target(caller, user)?;
			forbid_system_target(caller, user)?;
			forbid_grant(caller, permission)?;
			self.system_permission(caller, SystemPermission::Grant, false)
		})
	}

	#[instrument(name = "security::can_revoke_table", level = "trace", skip(self, credentials))]
	pub fn can_revoke_table(&self, credentials: &Credential, user: &str, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "revoke_table", format_args!("{} on {}", user, table_id), |caller| {
			forbid_system_target(caller, user)?;
			Ok(self.system_permission(caller, SystemPermission::AlterTable, false)?
				|| self.table_permission(caller, table_id, TablePermission::Grant, false)?)
		})
	}

	#[instrument(name = "security::can_export", level = "trace", skip(self, credentials))]
	pub fn can_export(&self, credentials: &Credential, table_id: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "export", table_id, |user| {
			self.table_permission(user, table_id, TablePermission::Read, false)
		})
	}

	#[instrument(name = "security::can_import", level = "trace", skip(self, credentials))]
	pub fn can_import(&self, credentials: &Credential) -> crate::Result<bool> {
		self.evaluate(credentials, "import", "", |user| {
			self.system_permission(user, SystemPermission::CreateTable, false)
		})
	}

	/// Succeeds if the caller asks about itself or may perform system
	/// actions; fails with PERMISSION_DENIED otherwise.
	#[instrument(name = "security::can_ask_about_user", level = "trace", skip(self, credentials))]
	pub fn can_ask_about_user(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		if !(self.can_perform_system_actions(credentials)? || credentials.principal() == user) {
			let err = SecurityError::permission_denied(credentials.principal());
			audit::failure(credentials.principal(), "ask_about_user", user, &err);
			return Err(err);
		}
		Ok(true)
	}

	/// Whether the caller may inspect the permissions of `user`: itself, or
	/// any user manager.
	#[instrument(name = "security::can_ask_about_other_users", level = "trace", skip(self, credentials))]
	pub fn can_ask_about_other_users(&self, credentials: &Credential, user: &str) -> crate::Result<bool> {
		self.evaluate(credentials, "ask_about_other_users", user, |caller| {
			if caller == user {
				return Ok(true);
			}
			for permission in [
				SystemPermission::System,
				SystemPermission::CreateUser,
				SystemPermission::AlterUser,
				SystemPermission::DropUser,
			] {
				if self.system_permission(caller, permission, false)? {
					return Ok(true);
				}
			}
			Ok(false)
		})
	}

	fn forbid_root_target(&self, caller: &str, user: &str) -> crate::Result<()> {
		if self.is_root(user, caller)? {
			return Err(SecurityError::permission_denied(caller));
		}
		Ok(())
	}
}

fn forbid_system_target(caller: &str, user: &str) -> crate::Result<()> {
	if user == SYSTEM_PRINCIPAL {
		return Err(SecurityError::permission_denied(caller));
	}
	Ok(())
}

fn forbid_grant(caller: &str, permission: SystemPermission) -> crate::Result<()> {
	if permission == SystemPermission::Grant {
		return Err(SecurityError::new(caller, SecurityErrorCode::GrantInvalid));
	}
	Ok(())
}
