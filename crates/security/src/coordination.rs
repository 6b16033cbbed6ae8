// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Hierarchical coordination state shared by the servers of an instance.

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;
use tracing::trace;

use crate::error::HandlerError;

/// Byte store addressed by `/`-separated paths.
///
/// Implementations decide their own durability and replication; callers only
/// rely on single-call atomicity.
pub trait Coordination: Send + Sync {
	fn get(&self, path: &str) -> Result<Option<Vec<u8>>, HandlerError>;

	fn put(&self, path: &str, data: Vec<u8>) -> Result<(), HandlerError>;

	/// Returns `false` without writing if the node already exists.
	fn put_if_absent(&self, path: &str, data: Vec<u8>) -> Result<bool, HandlerError>;

	/// Removes the node and every descendant. Missing nodes are not an error.
	fn delete_recursive(&self, path: &str) -> Result<(), HandlerError>;

	/// Names of the direct children of `path`, sorted.
	fn children(&self, path: &str) -> Result<Vec<String>, HandlerError>;

	fn exists(&self, path: &str) -> Result<bool, HandlerError> {
		Ok(self.get(path)?.is_some())
	}
}

/// Process-local [`Coordination`] used by tests and single-node deployments.
pub struct MemoryCoordination {
	nodes: RwLock<BTreeMap<String, Vec<u8>>>,
	available: AtomicBool,
}

impl Default for MemoryCoordination {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryCoordination {
	pub fn new() -> Self {
		Self {
			nodes: RwLock::new(BTreeMap::new()),
			available: AtomicBool::new(true),
		}
	}

	/// Simulate losing (or regaining) the connection to the store.
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::SeqCst);
	}

	fn check(&self) -> Result<(), HandlerError> {
		if self.available.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(HandlerError::Unavailable("memory coordination store is offline".to_string()))
		}
	}
}

impl Coordination for MemoryCoordination {
	fn get(&self, path: &str) -> Result<Option<Vec<u8>>, HandlerError> {
		self.check()?;
		Ok(self.nodes.read().get(path).cloned())
	}

	fn put(&self, path: &str, data: Vec<u8>) -> Result<(), HandlerError> {
		self.check()?;
		trace!(path, "coordination put");
		self.nodes.write().insert(path.to_string(), data);
		Ok(())
	}

	fn put_if_absent(&self, path: &str, data: Vec<u8>) -> Result<bool, HandlerError> {
		self.check()?;
		let mut nodes = self.nodes.write();
		if nodes.contains_key(path) {
			return Ok(false);
		}
		nodes.insert(path.to_string(), data);
		Ok(true)
	}

	fn delete_recursive(&self, path: &str) -> Result<(), HandlerError> {
		self.check()?;
		trace!(path, "coordination delete");
		let prefix = format!("{}/", path);
		self.nodes.write().retain(|key, _| key != path && !key.starts_with(&prefix));
		Ok(())
	}

	fn children(&self, path: &str) -> Result<Vec<String>, HandlerError> {
		self.check()?;
		let prefix = format!("{}/", path);
		let nodes = self.nodes.read();
		let result: BTreeSet<String> = nodes
			.range(prefix.clone()..)
			.take_while(|(key, _)| key.starts_with(&prefix))
			.map(|(key, _)| key[prefix.len()..].split('/').next().unwrap_or_default().to_string())
			.collect();
		Ok(result.into_iter().collect())
	}
}

/// Instance-scoped node paths.
pub mod paths {
	pub fn instance(instance_id: &str) -> String {
		format!("/reifydb/{}", instance_id)
	}

	pub fn root_user(instance_id: &str) -> String {
		format!("{}/root_user", instance(instance_id))
	}

	pub fn users(instance_id: &str) -> String {
		format!("{}/users", instance(instance_id))
	}

	pub fn user(instance_id: &str, principal: &str) -> String {
		format!("{}/{}", users(instance_id), segment(principal))
	}

	pub fn user_password(instance_id: &str, principal: &str) -> String {
		format!("{}/password", user(instance_id, principal))
	}

	pub fn user_authorizations(instance_id: &str, principal: &str) -> String {
		format!("{}/authorizations", user(instance_id, principal))
	}

	pub fn user_system_permissions(instance_id: &str, principal: &str) -> String {
		format!("{}/system_permissions", user(instance_id, principal))
	}

	pub fn user_table_permissions(instance_id: &str, principal: &str) -> String {
		format!("{}/table_permissions", user(instance_id, principal))
	}

	pub fn user_table_permission(instance_id: &str, principal: &str, table_id: &str) -> String {
		format!("{}/{}", user_table_permissions(instance_id, principal), segment(table_id))
	}

	pub fn tables(instance_id: &str) -> String {
		format!("{}/tables", instance(instance_id))
	}

	pub fn table(instance_id: &str, table_id: &str) -> String {
		format!("{}/{}", tables(instance_id), segment(table_id))
	}

	/// Escape a principal or table id so it always names exactly one node
	/// below its parent.
	pub fn segment(name: &str) -> String {
		name.replace('%', "%25").replace('/', "%2F")
	}

	/// Inverse of [`segment`], for names returned by `children`.
	pub fn decode_segment(encoded: &str) -> String {
		encoded.replace("%2F", "/").replace("%25", "%")
	}
}
