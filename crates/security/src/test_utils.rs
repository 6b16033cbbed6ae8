// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fixtures for tests of the security layer and its consumers.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use crate::{
	authorizations::Authorizations,
	config::{PasswordHashing, SecurityConfig},
	constants::PASSWORD_TOKEN,
	coordination::{Coordination, MemoryCoordination, paths},
	credential::Credential,
	engine::SecurityEngine,
	permission::{SystemPermission, TablePermission},
	registry::HandlerRegistry,
};

pub const TEST_INSTANCE: &str = "test-instance";
pub const ROOT: &str = "root";
pub const ROOT_PASSWORD: &str = "secret";

/// Install a fmt subscriber writing through the test harness. Safe to call
/// from every test.
pub fn init_tracing() {
	let _ = fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_test_writer()
		.try_init();
}

/// Argon2 cost low enough for debug builds.
pub fn test_hashing() -> PasswordHashing {
	PasswordHashing {
		memory_kib: 64,
		iterations: 1,
	}
}

pub fn test_config() -> SecurityConfig {
	SecurityConfig::new(TEST_INSTANCE).initialize(true).password_hashing(test_hashing())
}

/// An engine over memory coordination, bootstrapped with [`ROOT`].
pub struct TestInstance {
	pub coordination: Arc<MemoryCoordination>,
	pub engine: SecurityEngine,
}

impl TestInstance {
	/// Coordinated backends, bootstrapped.
	pub fn new() -> Self {
		Self::with_config(test_config())
	}

	/// Engine for `config`, bootstrapped with [`ROOT`].
	pub fn with_config(config: SecurityConfig) -> Self {
		Self::with_registry(config, &HandlerRegistry::with_defaults())
	}

	pub fn with_registry(config: SecurityConfig, registry: &HandlerRegistry) -> Self {
		init_tracing();
		let coordination = Arc::new(MemoryCoordination::new());
		let engine = SecurityEngine::build(&config, registry, coordination.clone())
			.expect("failed to build security engine");
		let instance = Self {
			coordination,
			engine,
		};
		instance
			.engine
			.initialize_security(&instance.system(), ROOT, ROOT_PASSWORD.as_bytes())
			.expect("failed to bootstrap security");
		instance
	}

	pub fn system(&self) -> Credential {
		self.engine.system_credentials().credential().clone()
	}

	pub fn root(&self) -> Credential {
		self.credential(ROOT, ROOT_PASSWORD)
	}

	pub fn credential(&self, user: &str, password: &str) -> Credential {
		Credential::new(user, TEST_INSTANCE, PASSWORD_TOKEN, password.as_bytes())
	}

	/// Create `user` as root, without authorizations. Returns its credential.
	pub fn create_user(&self, user: &str, password: &str) -> Credential {
		let credential = self.credential(user, password);
		self.engine
			.create_user(&self.root(), &credential, &Authorizations::empty())
			.expect("failed to create test user");
		credential
	}

	/// Register a table so table-scoped grants on it are accepted.
	pub fn create_table(&self, table_id: &str, name: &str) {
		self.coordination
			.put(&paths::table(TEST_INSTANCE, table_id), name.as_bytes().to_vec())
			.expect("failed to register test table");
	}

	pub fn grant_system(&self, user: &str, permission: SystemPermission) {
		self.engine
			.grant_system_permission(&self.root(), user, permission)
			.expect("failed to grant system permission");
	}

	pub fn grant_table(&self, user: &str, table_id: &str, permission: TablePermission) {
		self.engine
			.grant_table_permission(&self.root(), user, table_id, permission)
			.expect("failed to grant table permission");
	}
}

impl Default for TestInstance {
	fn default() -> Self {
		Self::new()
	}
}
