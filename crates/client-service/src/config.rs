// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Configuration views exposed to clients.

use std::collections::{BTreeMap, HashMap};

use reifydb_security::{HandlerError, Property, SiteConfiguration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationType {
	/// Effective configuration of the serving process.
	Current,
	/// Site file contents overlaid on the defaults.
	Site,
	/// Built-in defaults only.
	Default,
}

/// Where the facade reads configuration from.
pub trait ConfigurationSource: Send + Sync {
	fn configuration(&self, kind: ConfigurationType) -> SiteConfiguration;

	/// Effective configuration of one table, falling back to the site
	/// configuration for keys the table does not override.
	fn table_configuration(&self, table_id: &str) -> Result<SiteConfiguration, HandlerError>;
}

/// Fixed configuration, assembled once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticConfiguration {
	current: SiteConfiguration,
	site: SiteConfiguration,
	tables: HashMap<String, BTreeMap<String, String>>,
}

impl StaticConfiguration {
	pub fn new(site: SiteConfiguration) -> Self {
		Self {
			current: site.clone(),
			site,
			tables: HashMap::new(),
		}
	}

	/// Runtime overrides that only apply to [`ConfigurationType::Current`].
	pub fn with_current(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.current.set(key, value);
		self
	}

	pub fn with_table(
		mut self,
		table_id: impl Into<String>,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.tables.entry(table_id.into()).or_default().insert(key.into(), value.into());
		self
	}
}

impl ConfigurationSource for StaticConfiguration {
	fn configuration(&self, kind: ConfigurationType) -> SiteConfiguration {
		match kind {
			ConfigurationType::Current => self.current.clone(),
			ConfigurationType::Site => self.site.clone(),
			ConfigurationType::Default => SiteConfiguration::default(),
		}
	}

	fn table_configuration(&self, table_id: &str) -> Result<SiteConfiguration, HandlerError> {
		let mut result = self.current.clone();
		if let Some(overrides) = self.tables.get(table_id) {
			for (key, value) in overrides {
				result.set(key.clone(), value.clone());
			}
		}
		Ok(result)
	}
}

/// Key/value pairs safe to hand to a client: the instance secret and every
/// key naming a password are dropped.
pub fn redact(configuration: &SiteConfiguration) -> BTreeMap<String, String> {
	configuration
		.iter()
		.filter(|(key, _)| {
			key.as_str() != Property::InstanceSecret.key() && !key.to_lowercase().contains("password")
		})
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}
