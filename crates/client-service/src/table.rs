// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Table name resolution.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use reifydb_security::{
	Coordination, HandlerError,
	constants::{METADATA_TABLE_ID, METADATA_TABLE_NAME},
	coordination::paths,
};
use tracing::debug;

/// Maps table names to ids. Lookups may be answered from a cache that lags
/// behind table creation until [`TableCatalog::clear_cache`] is called.
pub trait TableCatalog: Send + Sync {
	fn table_id(&self, name: &str) -> Result<Option<String>, HandlerError>;

	fn clear_cache(&self);
}

/// [`TableCatalog`] over the table registry kept in coordination.
pub struct CoordinatedTableCatalog {
	coordination: Arc<dyn Coordination>,
	instance_id: String,
	cache: RwLock<Option<HashMap<String, String>>>,
}

impl CoordinatedTableCatalog {
	pub fn new(coordination: Arc<dyn Coordination>, instance_id: impl Into<String>) -> Self {
		Self {
			coordination,
			instance_id: instance_id.into(),
			cache: RwLock::new(None),
		}
	}

	fn load(&self) -> Result<HashMap<String, String>, HandlerError> {
		let mut result = HashMap::new();
		result.insert(METADATA_TABLE_NAME.to_string(), METADATA_TABLE_ID.to_string());

		for id in self.coordination.children(&paths::tables(&self.instance_id))? {
			let id = paths::decode_segment(&id);
			let Some(name) = self.coordination.get(&paths::table(&self.instance_id, &id))? else {
				continue;
			};
			let name = String::from_utf8(name)
				.map_err(|e| HandlerError::Internal(format!("table {} has an invalid name: {}", id, e)))?;
			result.insert(name, id);
		}

		debug!(instance_id = %self.instance_id, tables = result.len(), "loaded table names");
		Ok(result)
	}
}

impl TableCatalog for CoordinatedTableCatalog {
	fn table_id(&self, name: &str) -> Result<Option<String>, HandlerError> {
		if let Some(cache) = self.cache.read().as_ref() {
			return Ok(cache.get(name).cloned());
		}

		let loaded = self.load()?;
		let result = loaded.get(name).cloned();
		*self.cache.write() = Some(loaded);
		Ok(result)
	}

	fn clear_cache(&self) {
		*self.cache.write() = None;
	}
}

#[cfg(test)]
mod tests {
	use reifydb_security::MemoryCoordination;

	use super::*;

	const INSTANCE: &str = "catalog-test";

	fn catalog() -> (Arc<MemoryCoordination>, CoordinatedTableCatalog) {
		let coordination = Arc::new(MemoryCoordination::new());
		let catalog = CoordinatedTableCatalog::new(coordination.clone(), INSTANCE);
		(coordination, catalog)
	}

	#[test]
	fn test_metadata_table_is_always_known() {
		let (_, catalog) = catalog();
		assert_eq!(catalog.table_id(METADATA_TABLE_NAME).unwrap().as_deref(), Some(METADATA_TABLE_ID));
	}

	#[test]
	fn test_new_tables_appear_after_clear_cache() {
		let (coordination, catalog) = catalog();
		assert_eq!(catalog.table_id("orders").unwrap(), None);

		coordination.put(&paths::table(INSTANCE, "3"), b"orders".to_vec()).unwrap();
		assert_eq!(catalog.table_id("orders").unwrap(), None);

		catalog.clear_cache();
		assert_eq!(catalog.table_id("orders").unwrap().as_deref(), Some("3"));
	}

	#[test]
	fn test_unavailable_coordination_is_reported() {
		let (coordination, catalog) = catalog();
		coordination.set_available(false);
		assert!(matches!(catalog.table_id("orders"), Err(HandlerError::Unavailable(_))));
	}
}
