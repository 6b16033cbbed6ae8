// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Backends that keep users, authorizations and grants in the coordination
//! store.
//!
//! User nodes are created by [`CoordinatedAuthenticator`]; the authorizor and
//! permission handler hang their records below those nodes and therefore only
//! work together with it.

use std::{collections::BTreeSet, sync::Arc};

use argon2::{
	Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version, password_hash::SaltString,
};
use dashmap::DashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
	authorizations::Authorizations,
	config::PasswordHashing,
	constants::{METADATA_TABLE_ID, PASSWORD_TOKEN},
	coordination::{Coordination, paths},
	credential::{Credential, Token},
	error::{HandlerError, SecurityErrorCode},
	handler::{Authenticator, Authorizor, PermissionHandler},
	permission::{SystemPermission, TablePermission, encode_ids},
};

pub const COORDINATED: &str = "coordinated";

/// User names become coordination node names and may not be empty or
/// contain the path separator.
fn valid_principal(principal: &str) -> bool {
	!principal.is_empty() && !principal.contains('/')
}

pub struct CoordinatedAuthenticator {
	coordination: Arc<dyn Coordination>,
	instance_id: String,
	hasher: Argon2<'static>,
}

impl CoordinatedAuthenticator {
	pub fn new(
		coordination: Arc<dyn Coordination>,
		instance_id: impl Into<String>,
		hashing: PasswordHashing,
	) -> Result<Self, HandlerError> {
		let params = Params::new(hashing.memory_kib, hashing.iterations, 1, None)
			.map_err(|e| HandlerError::Internal(format!("invalid password hashing parameters: {}", e)))?;
		Ok(Self {
			coordination,
			instance_id: instance_id.into(),
			hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
		})
	}

	fn password<'a>(&self, principal: &str, token: &'a Token) -> Result<&'a [u8], HandlerError> {
		match token {
			Token::Password(password) => Ok(password),
			Token::Null => Err(HandlerError::security(principal, SecurityErrorCode::InvalidToken)),
		}
	}

	fn hash(&self, password: &[u8]) -> Result<Vec<u8>, HandlerError> {
		let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
			.map_err(|e| HandlerError::Internal(format!("unable to encode salt: {}", e)))?;
		let hash = self
			.hasher
			.hash_password(password, &salt)
			.map_err(|e| HandlerError::Internal(format!("unable to hash password: {}", e)))?;
		Ok(hash.to_string().into_bytes())
	}

	fn store_password(&self, principal: &str, token: &Token) -> Result<(), HandlerError> {
		let password = self.password(principal, token)?;
		let hash = self.hash(password)?;
		self.coordination.put(&paths::user_password(&self.instance_id, principal), hash)
	}
}

impl Authenticator for CoordinatedAuthenticator {
	fn name(&self) -> &'static str {
		COORDINATED
	}

	fn initialize(&self, _instance_id: &str, initialize: bool) -> Result<(), HandlerError> {
		if initialize {
			self.coordination.put_if_absent(&paths::users(&self.instance_id), Vec::new())?;
		}
		Ok(())
	}

	fn valid_security_handlers(&self, _authorizor: &dyn Authorizor, _permissions: &dyn PermissionHandler) -> bool {
		true
	}

	#[instrument(name = "security::authenticator::initialize_security", level = "debug", skip(self, credentials, token))]
	fn initialize_security(&self, credentials: &Credential, root: &str, token: &[u8]) -> Result<(), HandlerError> {
		let users = paths::users(&self.instance_id);
		self.coordination.delete_recursive(&users)?;
		self.coordination.put(&users, Vec::new())?;
		self.coordination.put(&paths::user(&self.instance_id, root), Vec::new())?;
		self.store_password(root, &Token::Password(token.to_vec()))?;
		debug!(root, requested_by = credentials.principal(), "initialized user store");
		Ok(())
	}

	fn authenticate_user(&self, principal: &str, token: &Token) -> Result<bool, HandlerError> {
		let password = self.password(principal, token)?;
		let Some(stored) = self.coordination.get(&paths::user_password(&self.instance_id, principal))? else {
			return Ok(false);
		};
		let stored = String::from_utf8(stored)
			.map_err(|_| HandlerError::Internal(format!("corrupt password hash for {}", principal)))?;
		let hash = PasswordHash::new(&stored)
			.map_err(|e| HandlerError::Internal(format!("corrupt password hash for {}: {}", principal, e)))?;
		Ok(self.hasher.verify_password(password, &hash).is_ok())
	}

	fn list_users(&self) -> Result<BTreeSet<String>, HandlerError> {
		let users = self.coordination.children(&paths::users(&self.instance_id))?;
		Ok(users.iter().map(|user| paths::decode_segment(user)).collect())
	}

	fn create_user(&self, principal: &str, token: &Token) -> Result<(), HandlerError> {
		if !valid_principal(principal) {
			return Err(HandlerError::Internal(format!("invalid user name '{}'", principal)));
		}
		self.password(principal, token)?;
		if !self.coordination.put_if_absent(&paths::user(&self.instance_id, principal), Vec::new())? {
			return Err(HandlerError::security(principal, SecurityErrorCode::UserExists));
		}
		self.store_password(principal, token)
	}

	fn drop_user(&self, principal: &str) -> Result<(), HandlerError> {
		self.coordination.delete_recursive(&paths::user(&self.instance_id, principal))
	}

	fn change_password(&self, principal: &str, token: &Token) -> Result<(), HandlerError> {
		if !self.user_exists(principal)? {
			return Err(HandlerError::security(principal, SecurityErrorCode::UserDoesntExist));
		}
		self.store_password(principal, token)
	}

	fn user_exists(&self, principal: &str) -> Result<bool, HandlerError> {
		if !valid_principal(principal) {
			return Ok(false);
		}
		self.coordination.exists(&paths::user(&self.instance_id, principal))
	}

	fn valid_token_kind(&self, kind: &str) -> bool {
		kind == PASSWORD_TOKEN
	}

	fn token_login_kind(&self) -> Option<&'static str> {
		Some(PASSWORD_TOKEN)
	}
}

pub struct CoordinatedAuthorizor {
	coordination: Arc<dyn Coordination>,
	instance_id: String,
	cache: DashMap<String, Authorizations>,
}

impl CoordinatedAuthorizor {
	pub fn new(coordination: Arc<dyn Coordination>, instance_id: impl Into<String>) -> Self {
		Self {
			coordination,
			instance_id: instance_id.into(),
			cache: DashMap::new(),
		}
	}

	fn store(&self, principal: &str, authorizations: &Authorizations) -> Result<(), HandlerError> {
		let data = serde_json::to_vec(authorizations)
			.map_err(|e| HandlerError::Internal(format!("unable to encode authorizations: {}", e)))?;
		self.coordination.put(&paths::user_authorizations(&self.instance_id, principal), data)?;
		self.cache.insert(principal.to_string(), authorizations.clone());
		Ok(())
	}
}

impl Authorizor for CoordinatedAuthorizor {
	fn name(&self) -> &'static str {
		COORDINATED
	}

	fn initialize(&self, _instance_id: &str, _initialize: bool) -> Result<(), HandlerError> {
		Ok(())
	}

	fn valid_security_handlers(
		&self,
		authenticator: &dyn Authenticator,
		_permissions: &dyn PermissionHandler,
	) -> bool {
		authenticator.name() == COORDINATED
	}

	fn initialize_security(&self, _credentials: &Credential, root: &str) -> Result<(), HandlerError> {
		self.cache.clear();
		self.store(root, &Authorizations::empty())
	}

	fn get_cached_user_authorizations(&self, principal: &str) -> Result<Authorizations, HandlerError> {
		if let Some(cached) = self.cache.get(principal) {
			return Ok(cached.value().clone());
		}

		let authorizations = match self.coordination.get(&paths::user_authorizations(&self.instance_id, principal))? {
			Some(data) => serde_json::from_slice(&data).map_err(|e| {
				HandlerError::Internal(format!("corrupt authorizations for {}: {}", principal, e))
			})?,
			None => Authorizations::empty(),
		};
		self.cache.insert(principal.to_string(), authorizations.clone());
		Ok(authorizations)
	}

	fn change_authorizations(&self, principal: &str, authorizations: &Authorizations) -> Result<(), HandlerError> {
		self.store(principal, authorizations)
	}

	fn init_user(&self, principal: &str) -> Result<(), HandlerError> {
		let data = serde_json::to_vec(&Authorizations::empty())
			.map_err(|e| HandlerError::Internal(format!("unable to encode authorizations: {}", e)))?;
		self.coordination.put_if_absent(&paths::user_authorizations(&self.instance_id, principal), data)?;
		self.cache.remove(principal);
		Ok(())
	}

	fn drop_user(&self, principal: &str) -> Result<(), HandlerError> {
		self.cache.remove(principal);
		self.coordination.delete_recursive(&paths::user_authorizations(&self.instance_id, principal))
	}
}

/// Grants are stored as sorted permission ids. Lookups go through a
/// path-keyed snapshot: fresh lookups refresh it, cached lookups only fill
/// it on a miss.
pub struct CoordinatedPermissionHandler {
	coordination: Arc<dyn Coordination>,
	instance_id: String,
	snapshot: DashMap<String, Option<Vec<u8>>>,
}

impl CoordinatedPermissionHandler {
	pub fn new(coordination: Arc<dyn Coordination>, instance_id: impl Into<String>) -> Self {
		Self {
			coordination,
			instance_id: instance_id.into(),
			snapshot: DashMap::new(),
		}
	}

	fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, HandlerError> {
		let data = self.coordination.get(path)?;
		self.snapshot.insert(path.to_string(), data.clone());
		Ok(data)
	}

	fn fetch_cached(&self, path: &str) -> Result<Option<Vec<u8>>, HandlerError> {
		if let Some(entry) = self.snapshot.get(path) {
			return Ok(entry.value().clone());
		}
		self.fetch(path)
	}

	fn write(&self, path: &str, ids: Vec<u8>) -> Result<(), HandlerError> {
		self.coordination.put(path, ids.clone())?;
		self.snapshot.insert(path.to_string(), Some(ids));
		Ok(())
	}

	fn forget(&self, prefix: &str) {
		let children = format!("{}/", prefix);
		self.snapshot.retain(|path, _| path != prefix && !path.starts_with(&children));
	}

	fn table_exists(&self, table_id: &str) -> Result<bool, HandlerError> {
		if table_id == METADATA_TABLE_ID {
			return Ok(true);
		}
		self.coordination.exists(&paths::table(&self.instance_id, table_id))
	}

	fn ensure_table(&self, table_id: &str) -> Result<(), HandlerError> {
		if self.table_exists(table_id)? {
			Ok(())
		} else {
			Err(HandlerError::TableNotFound {
				table_id: table_id.to_string(),
			})
		}
	}

	fn table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
		cached: bool,
	) -> Result<bool, HandlerError> {
		let path = paths::user_table_permission(&self.instance_id, principal, table_id);
		let granted = if cached {
			self.fetch_cached(&path)?
		} else {
			self.fetch(&path)?
		};
		match granted {
			Some(ids) => Ok(ids.contains(&permission.id())),
			None => {
				self.ensure_table(table_id)?;
				Ok(false)
			}
		}
	}

	fn modify(&self, path: &str, id: u8, grant: bool) -> Result<(), HandlerError> {
		let current = self.fetch(path)?.unwrap_or_default();
		let updated = if grant {
			encode_ids(current.into_iter().chain([id]))
		} else {
			encode_ids(current.into_iter().filter(|existing| *existing != id))
		};
		self.write(path, updated)
	}
}

impl PermissionHandler for CoordinatedPermissionHandler {
	fn name(&self) -> &'static str {
		COORDINATED
	}

	fn initialize(&self, _instance_id: &str, initialize: bool) -> Result<(), HandlerError> {
		if initialize {
			self.coordination.put_if_absent(&paths::tables(&self.instance_id), Vec::new())?;
		}
		Ok(())
	}

	fn valid_security_handlers(&self, authenticator: &dyn Authenticator, _authorizor: &dyn Authorizor) -> bool {
		authenticator.name() == COORDINATED
	}

	fn initialize_security(&self, _credentials: &Credential, root: &str) -> Result<(), HandlerError> {
		self.snapshot.clear();
		self.write(
			&paths::user_system_permissions(&self.instance_id, root),
			encode_ids(SystemPermission::ALL.iter().map(SystemPermission::id)),
		)?;
		self.coordination.put(&paths::user_table_permissions(&self.instance_id, root), Vec::new())?;
		self.write(
			&paths::user_table_permission(&self.instance_id, root, METADATA_TABLE_ID),
			encode_ids([TablePermission::Read.id(), TablePermission::Write.id()]),
		)
	}

	fn has_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<bool, HandlerError> {
		let granted = self.fetch(&paths::user_system_permissions(&self.instance_id, principal))?;
		Ok(granted.is_some_and(|ids| ids.contains(&permission.id())))
	}

	fn has_cached_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> Result<bool, HandlerError> {
		let granted = self.fetch_cached(&paths::user_system_permissions(&self.instance_id, principal))?;
		Ok(granted.is_some_and(|ids| ids.contains(&permission.id())))
	}

	fn has_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<bool, HandlerError> {
		self.table_permission(principal, table_id, permission, false)
	}

	fn has_cached_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<bool, HandlerError> {
		self.table_permission(principal, table_id, permission, true)
	}

	fn grant_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<(), HandlerError> {
		self.modify(&paths::user_system_permissions(&self.instance_id, principal), permission.id(), true)
	}

	fn revoke_system_permission(&self, principal: &str, permission: SystemPermission) -> Result<(), HandlerError> {
		self.modify(&paths::user_system_permissions(&self.instance_id, principal), permission.id(), false)
	}

	fn grant_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<(), HandlerError> {
		self.ensure_table(table_id)?;
		self.modify(&paths::user_table_permission(&self.instance_id, principal, table_id), permission.id(), true)
	}

	fn revoke_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> Result<(), HandlerError> {
		self.ensure_table(table_id)?;
		self.modify(&paths::user_table_permission(&self.instance_id, principal, table_id), permission.id(), false)
	}

	fn clean_table_permissions(&self, table_id: &str) -> Result<(), HandlerError> {
		for user in self.coordination.children(&paths::users(&self.instance_id))? {
			let path = paths::user_table_permission(&self.instance_id, &paths::decode_segment(&user), table_id);
			self.coordination.delete_recursive(&path)?;
			self.forget(&path);
		}
		Ok(())
	}

	fn init_user(&self, principal: &str) -> Result<(), HandlerError> {
		self.coordination.put_if_absent(&paths::user_system_permissions(&self.instance_id, principal), Vec::new())?;
		self.coordination.put_if_absent(&paths::user_table_permissions(&self.instance_id, principal), Vec::new())?;
		self.forget(&paths::user(&self.instance_id, principal));
		Ok(())
	}

	fn clean_user(&self, principal: &str) -> Result<(), HandlerError> {
		self.coordination.delete_recursive(&paths::user_system_permissions(&self.instance_id, principal))?;
		self.coordination.delete_recursive(&paths::user_table_permissions(&self.instance_id, principal))?;
		self.forget(&paths::user(&self.instance_id, principal));
		Ok(())
	}
}
