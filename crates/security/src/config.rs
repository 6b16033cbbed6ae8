// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Site configuration and the security settings derived from it.

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Configuration keys understood by the security layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
	InstanceSecret,
	InstanceSecurityAuthenticator,
	InstanceSecurityAuthorizor,
	InstanceSecurityPermissionHandler,
	InstanceCoordinationHosts,
}

impl Property {
	pub const ALL: [Property; 5] = [
		Property::InstanceSecret,
		Property::InstanceSecurityAuthenticator,
		Property::InstanceSecurityAuthorizor,
		Property::InstanceSecurityPermissionHandler,
		Property::InstanceCoordinationHosts,
	];

	pub fn key(&self) -> &'static str {
		match self {
			Property::InstanceSecret => "instance.secret",
			Property::InstanceSecurityAuthenticator => "instance.security.authenticator",
			Property::InstanceSecurityAuthorizor => "instance.security.authorizor",
			Property::InstanceSecurityPermissionHandler => "instance.security.permissionHandler",
			Property::InstanceCoordinationHosts => "instance.zookeeper.host",
		}
	}

	pub fn default_value(&self) -> &'static str {
		match self {
			Property::InstanceSecret => "DEFAULT",
			Property::InstanceSecurityAuthenticator => "coordinated",
			Property::InstanceSecurityAuthorizor => "coordinated",
			Property::InstanceSecurityPermissionHandler => "coordinated",
			Property::InstanceCoordinationHosts => "localhost:2181",
		}
	}
}

/// Ordered key/value configuration, seeded with the defaults of every
/// [`Property`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteConfiguration {
	entries: BTreeMap<String, String>,
}

impl Default for SiteConfiguration {
	fn default() -> Self {
		Self {
			entries: Property::ALL
				.iter()
				.map(|p| (p.key().to_string(), p.default_value().to_string()))
				.collect(),
		}
	}
}

impl SiteConfiguration {
	/// Configuration without any defaults.
	pub fn empty() -> Self {
		Self {
			entries: BTreeMap::new(),
		}
	}

	/// Defaults overlaid with the entries of a JSON object.
	pub fn from_json(json: &str) -> Result<Self, BuildError> {
		let overrides: BTreeMap<String, String> =
			serde_json::from_str(json).map_err(|e| BuildError::Config(e.to_string()))?;
		let mut result = Self::default();
		result.entries.extend(overrides);
		Ok(result)
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);
		self
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.entries.insert(key.into(), value.into());
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	/// Value of a known property, falling back to its default.
	pub fn property(&self, property: Property) -> &str {
		self.get(property.key()).unwrap_or(property.default_value())
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<'a> IntoIterator for &'a SiteConfiguration {
	type Item = (&'a String, &'a String);
	type IntoIter = btree_map::Iter<'a, String, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

impl FromIterator<(String, String)> for SiteConfiguration {
	fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

/// Settings the security engine is assembled from.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
	pub instance_id: String,
	pub secret: String,
	pub authenticator: String,
	pub authorizor: String,
	pub permission_handler: String,
	/// Whether backends should perform first-time setup of their storage.
	pub initialize: bool,
	pub password_hashing: PasswordHashing,
}

/// Cost of the argon2 hashes stored for user passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashing {
	pub memory_kib: u32,
	pub iterations: u32,
}

impl Default for PasswordHashing {
	fn default() -> Self {
		Self {
			memory_kib: 19 * 1024,
			iterations: 2,
		}
	}
}

impl SecurityConfig {
	pub fn new(instance_id: impl Into<String>) -> Self {
		Self {
			instance_id: instance_id.into(),
			secret: Property::InstanceSecret.default_value().to_string(),
			authenticator: Property::InstanceSecurityAuthenticator.default_value().to_string(),
			authorizor: Property::InstanceSecurityAuthorizor.default_value().to_string(),
			permission_handler: Property::InstanceSecurityPermissionHandler.default_value().to_string(),
			initialize: false,
			password_hashing: PasswordHashing::default(),
		}
	}

	pub fn from_site(instance_id: impl Into<String>, site: &SiteConfiguration) -> Self {
		Self {
			instance_id: instance_id.into(),
			secret: site.property(Property::InstanceSecret).to_string(),
			authenticator: site.property(Property::InstanceSecurityAuthenticator).to_string(),
			authorizor: site.property(Property::InstanceSecurityAuthorizor).to_string(),
			permission_handler: site.property(Property::InstanceSecurityPermissionHandler).to_string(),
			initialize: false,
			password_hashing: PasswordHashing::default(),
		}
	}

	pub fn secret(mut self, secret: impl Into<String>) -> Self {
		self.secret = secret.into();
		self
	}

	pub fn authenticator(mut self, name: impl Into<String>) -> Self {
		self.authenticator = name.into();
		self
	}

	pub fn authorizor(mut self, name: impl Into<String>) -> Self {
		self.authorizor = name.into();
		self
	}

	pub fn permission_handler(mut self, name: impl Into<String>) -> Self {
		self.permission_handler = name.into();
		self
	}

	/// Use the same backend name for all three capability sets.
	pub fn handlers(self, name: &str) -> Self {
		self.authenticator(name).authorizor(name).permission_handler(name)
	}

	pub fn password_hashing(mut self, password_hashing: PasswordHashing) -> Self {
		self.password_hashing = password_hashing;
		self
	}

	pub fn initialize(mut self, initialize: bool) -> Self {
		self.initialize = initialize;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_cover_every_property() {
		let site = SiteConfiguration::default();
		for property in Property::ALL {
			assert_eq!(site.get(property.key()), Some(property.default_value()));
		}
	}

	#[test]
	fn test_from_json_overrides_defaults() {
		let site = SiteConfiguration::from_json(
			r#"{"instance.security.authenticator": "insecure", "table.split.threshold": "1G"}"#,
		)
		.unwrap();
		assert_eq!(site.property(Property::InstanceSecurityAuthenticator), "insecure");
		assert_eq!(site.property(Property::InstanceSecurityAuthorizor), "coordinated");
		assert_eq!(site.get("table.split.threshold"), Some("1G"));
	}

	#[test]
	fn test_from_json_rejects_non_string_values() {
		assert!(SiteConfiguration::from_json(r#"{"instance.secret": 42}"#).is_err());
	}

	#[test]
	fn test_security_config_from_site() {
		let site = SiteConfiguration::default().with(Property::InstanceSecret.key(), "s3cr3t");
		let config = SecurityConfig::from_site("instance", &site);
		assert_eq!(config.instance_id, "instance");
		assert_eq!(config.secret, "s3cr3t");
		assert_eq!(config.permission_handler, "coordinated");
	}

	#[test]
	fn test_property_falls_back_to_default_when_missing() {
		let site = SiteConfiguration::empty();
		assert_eq!(site.property(Property::InstanceSecret), "DEFAULT");
		assert!(site.is_empty());
	}
}
