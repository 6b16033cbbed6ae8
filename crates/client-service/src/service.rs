// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::Arc,
};

use reifydb_security::{
	Authorizations, Credential, Property, SecurityEngine, SecurityError, SiteConfiguration, SystemPermission,
	TablePermission,
};
use tracing::{debug, info, instrument, warn};

use crate::{
	Result,
	bulk::BulkImporter,
	config::{ConfigurationSource, ConfigurationType, redact},
	error::{ServiceError, TableOperation},
	table::TableCatalog,
};

/// Static facts about the instance a server belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
	pub instance_id: String,
	pub root_tablet_location: Option<String>,
	pub coordination_hosts: String,
}

impl InstanceDescriptor {
	pub fn new(instance_id: impl Into<String>, coordination_hosts: impl Into<String>) -> Self {
		Self {
			instance_id: instance_id.into(),
			root_tablet_location: None,
			coordination_hosts: coordination_hosts.into(),
		}
	}

	pub fn from_site(instance_id: impl Into<String>, site: &SiteConfiguration) -> Self {
		Self::new(instance_id, site.property(Property::InstanceCoordinationHosts))
	}

	pub fn root_tablet_location(mut self, location: impl Into<String>) -> Self {
		self.root_tablet_location = Some(location.into());
		self
	}
}

/// Client RPC calls backed by the [`SecurityEngine`].
pub struct ClientService {
	security: Arc<SecurityEngine>,
	instance: InstanceDescriptor,
	tables: Arc<dyn TableCatalog>,
	configuration: Arc<dyn ConfigurationSource>,
	importer: Arc<dyn BulkImporter>,
}

impl ClientService {
	pub fn new(
		security: Arc<SecurityEngine>,
		instance: InstanceDescriptor,
		tables: Arc<dyn TableCatalog>,
		configuration: Arc<dyn ConfigurationSource>,
		importer: Arc<dyn BulkImporter>,
	) -> Self {
		Self {
			security,
			instance,
			tables,
			configuration,
			importer,
		}
	}

	pub fn instance_id(&self) -> &str {
		&self.instance.instance_id
	}

	pub fn root_tablet_location(&self) -> Option<&str> {
		self.instance.root_tablet_location.as_deref()
	}

	pub fn coordination_hosts(&self) -> &str {
		&self.instance.coordination_hosts
	}

	/// Liveness probe. Does not authenticate.
	pub fn ping(&self, credentials: &Credential) {
		info!(principal = credentials.principal(), "ping");
	}

	/// Resolve a table name to its id. A miss clears the catalog cache and
	/// retries once before reporting the table as not found.
	fn check_table_id(&self, name: &str, operation: TableOperation) -> Result<String> {
		if let Some(id) = self.tables.table_id(name)? {
			return Ok(id);
		}

		self.tables.clear_cache();
		match self.tables.table_id(name)? {
			Some(id) => Ok(id),
			None => {
				debug!(table = name, %operation, "table not found");
				Err(ServiceError::table_not_found(name, operation))
			}
		}
	}

	#[instrument(name = "client::authenticate_user", level = "debug", skip(self, credentials, to_auth))]
	pub fn authenticate_user(&self, credentials: &Credential, to_auth: &Credential) -> Result<bool> {
		Ok(self.security.authenticate_user(credentials, to_auth)?)
	}

	#[instrument(name = "client::change_authorizations", level = "debug", skip(self, credentials, authorizations))]
	pub fn change_authorizations(
		&self,
		credentials: &Credential,
		user: &str,
		authorizations: Vec<Vec<u8>>,
	) -> Result<()> {
		Ok(self.security.change_authorizations(credentials, user, &Authorizations::new(authorizations))?)
	}

	#[instrument(name = "client::change_password", level = "debug", skip(self, credentials, to_change))]
	pub fn change_password(&self, credentials: &Credential, to_change: &Credential) -> Result<()> {
		Ok(self.security.change_password(credentials, to_change)?)
	}

	#[instrument(name = "client::create_user", level = "debug", skip(self, credentials, new_user, authorizations))]
	pub fn create_user(
		&self,
		credentials: &Credential,
		new_user: &Credential,
		authorizations: Vec<Vec<u8>>,
	) -> Result<()> {
		Ok(self.security.create_user(credentials, new_user, &Authorizations::new(authorizations))?)
	}

	#[instrument(name = "client::drop_user", level = "debug", skip(self, credentials))]
	pub fn drop_user(&self, credentials: &Credential, user: &str) -> Result<()> {
		Ok(self.security.drop_user(credentials, user)?)
	}

	#[instrument(name = "client::get_user_authorizations", level = "debug", skip(self, credentials))]
	pub fn get_user_authorizations(&self, credentials: &Credential, user: &str) -> Result<Vec<Vec<u8>>> {
		Ok(self.security.get_user_authorizations(credentials, user)?.into_labels())
	}

	#[instrument(name = "client::grant_system_permission", level = "debug", skip(self, credentials))]
	pub fn grant_system_permission(&self, credentials: &Credential, user: &str, permission: u8) -> Result<()> {
		let permission = system_permission(permission)?;
		Ok(self.security.grant_system_permission(credentials, user, permission)?)
	}

	#[instrument(name = "client::grant_table_permission", level = "debug", skip(self, credentials))]
	pub fn grant_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_name: &str,
		permission: u8,
	) -> Result<()> {
		let table_id = self.check_table_id(table_name, TableOperation::Permission)?;
		let permission = table_permission(permission)?;
		Ok(self.security.grant_table_permission(credentials, user, &table_id, permission)?)
	}

	#[instrument(name = "client::revoke_system_permission", level = "debug", skip(self, credentials))]
	pub fn revoke_system_permission(&self, credentials: &Credential, user: &str, permission: u8) -> Result<()> {
		let permission = system_permission(permission)?;
		Ok(self.security.revoke_system_permission(credentials, user, permission)?)
	}

	#[instrument(name = "client::revoke_table_permission", level = "debug", skip(self, credentials))]
	pub fn revoke_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_name: &str,
		permission: u8,
	) -> Result<()> {
		let table_id = self.check_table_id(table_name, TableOperation::Permission)?;
		let permission = table_permission(permission)?;
		Ok(self.security.revoke_table_permission(credentials, user, &table_id, permission)?)
	}

	#[instrument(name = "client::has_system_permission", level = "trace", skip(self, credentials))]
	pub fn has_system_permission(&self, credentials: &Credential, user: &str, permission: u8) -> Result<bool> {
		let permission = system_permission(permission)?;
		Ok(self.security.has_system_permission(credentials, user, permission)?)
	}

	#[instrument(name = "client::has_table_permission", level = "trace", skip(self, credentials))]
	pub fn has_table_permission(
		&self,
		credentials: &Credential,
		user: &str,
		table_name: &str,
		permission: u8,
	) -> Result<bool> {
		let table_id = self.check_table_id(table_name, TableOperation::Permission)?;
		let permission = table_permission(permission)?;
		Ok(self.security.has_table_permission(credentials, user, &table_id, permission)?)
	}

	#[instrument(name = "client::list_users", level = "trace", skip(self, credentials))]
	pub fn list_users(&self, credentials: &Credential) -> Result<BTreeSet<String>> {
		Ok(self.security.list_users(credentials)?)
	}

	/// Redacted configuration of the requested kind. Any valid credential
	/// may read it.
	#[instrument(name = "client::get_configuration", level = "debug", skip(self, credentials))]
	pub fn get_configuration(
		&self,
		credentials: &Credential,
		kind: ConfigurationType,
	) -> Result<BTreeMap<String, String>> {
		self.security.authenticate_user(credentials, credentials)?;
		Ok(redact(&self.configuration.configuration(kind)))
	}

	/// Redacted effective configuration of a table, looked up by name.
	#[instrument(name = "client::get_table_configuration", level = "debug", skip(self, credentials))]
	pub fn get_table_configuration(
		&self,
		credentials: &Credential,
		table_name: &str,
	) -> Result<BTreeMap<String, String>> {
		let table_id = self.check_table_id(table_name, TableOperation::GetConfiguration)?;
		self.security.authenticate_user(credentials, credentials)?;
		Ok(redact(&self.configuration.table_configuration(&table_id)?))
	}

	/// Hand a bulk load to the importer. Only principals holding the
	/// SYSTEM permission may call this.
	#[instrument(name = "client::bulk_import_files", level = "debug", skip(self, credentials, files))]
	pub fn bulk_import_files(
		&self,
		credentials: &Credential,
		tid: u64,
		table_id: &str,
		files: &[String],
		error_dir: &str,
		set_time: bool,
	) -> Result<Vec<String>> {
		let principal = credentials.principal();
		if !self.security.has_system_permission(credentials, principal, SystemPermission::System)? {
			warn!(principal, tid, table_id, "bulk import denied");
			return Err(SecurityError::permission_denied(principal).into());
		}

		let result = self.importer.bulk_import(credentials, tid, table_id, files, error_dir, set_time)?;
		info!(principal, tid, table_id, files = files.len(), failed = result.len(), "bulk import finished");
		Ok(result)
	}

	pub fn is_active(&self, tid: u64) -> bool {
		self.importer.is_active(tid)
	}
}

fn system_permission(id: u8) -> Result<SystemPermission> {
	SystemPermission::from_id(id)
		.ok_or_else(|| ServiceError::InvalidArgument(format!("unknown system permission id {}", id)))
}

fn table_permission(id: u8) -> Result<TablePermission> {
	TablePermission::from_id(id)
		.ok_or_else(|| ServiceError::InvalidArgument(format!("unknown table permission id {}", id)))
}
