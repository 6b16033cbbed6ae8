// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Name → constructor mapping for each backend capability set.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
	config::{PasswordHashing, SecurityConfig},
	coordination::Coordination,
	error::{BuildError, HandlerError},
	handler::{
		Authenticator, Authorizor, CoordinatedAuthenticator, CoordinatedAuthorizor, CoordinatedPermissionHandler,
		InsecureAuthenticator, InsecureAuthorizor, InsecurePermissionHandler, PermissionHandler,
		coordinated::COORDINATED, insecure::INSECURE,
	},
};

/// Everything a backend constructor may depend on.
#[derive(Clone)]
pub struct HandlerContext {
	pub instance_id: String,
	pub coordination: Arc<dyn Coordination>,
	pub password_hashing: PasswordHashing,
}

pub type AuthenticatorFactory =
	Arc<dyn Fn(&HandlerContext) -> Result<Box<dyn Authenticator>, HandlerError> + Send + Sync>;
pub type AuthorizorFactory = Arc<dyn Fn(&HandlerContext) -> Result<Box<dyn Authorizor>, HandlerError> + Send + Sync>;
pub type PermissionHandlerFactory =
	Arc<dyn Fn(&HandlerContext) -> Result<Box<dyn PermissionHandler>, HandlerError> + Send + Sync>;

/// The three backends selected for one engine.
pub struct Handlers {
	pub authenticator: Box<dyn Authenticator>,
	pub authorizor: Box<dyn Authorizor>,
	pub permissions: Box<dyn PermissionHandler>,
}

pub struct HandlerRegistry {
	authenticators: HashMap<String, AuthenticatorFactory>,
	authorizors: HashMap<String, AuthorizorFactory>,
	permission_handlers: HashMap<String, PermissionHandlerFactory>,
}

impl Default for HandlerRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}

impl HandlerRegistry {
	/// Registry without any backend.
	pub fn new() -> Self {
		Self {
			authenticators: HashMap::new(),
			authorizors: HashMap::new(),
			permission_handlers: HashMap::new(),
		}
	}

	/// Registry knowing the `coordinated` and `insecure` backends.
	pub fn with_defaults() -> Self {
		Self::new()
			.register_authenticator(COORDINATED, |ctx| {
				Ok(Box::new(CoordinatedAuthenticator::new(
					ctx.coordination.clone(),
					ctx.instance_id.clone(),
					ctx.password_hashing,
				)?))
			})
			.register_authorizor(COORDINATED, |ctx| {
				Ok(Box::new(CoordinatedAuthorizor::new(ctx.coordination.clone(), ctx.instance_id.clone())))
			})
			.register_permission_handler(COORDINATED, |ctx| {
				Ok(Box::new(CoordinatedPermissionHandler::new(ctx.coordination.clone(), ctx.instance_id.clone())))
			})
			.register_authenticator(INSECURE, |_| Ok(Box::new(InsecureAuthenticator)))
			.register_authorizor(INSECURE, |_| Ok(Box::new(InsecureAuthorizor)))
			.register_permission_handler(INSECURE, |_| Ok(Box::new(InsecurePermissionHandler)))
	}

	pub fn register_authenticator(
		mut self,
		name: impl Into<String>,
		factory: impl Fn(&HandlerContext) -> Result<Box<dyn Authenticator>, HandlerError> + Send + Sync + 'static,
	) -> Self {
		self.authenticators.insert(name.into(), Arc::new(factory));
		self
	}

	pub fn register_authorizor(
		mut self,
		name: impl Into<String>,
		factory: impl Fn(&HandlerContext) -> Result<Box<dyn Authorizor>, HandlerError> + Send + Sync + 'static,
	) -> Self {
		self.authorizors.insert(name.into(), Arc::new(factory));
		self
	}

	pub fn register_permission_handler(
		mut self,
		name: impl Into<String>,
		factory: impl Fn(&HandlerContext) -> Result<Box<dyn PermissionHandler>, HandlerError> + Send + Sync + 'static,
	) -> Self {
		self.permission_handlers.insert(name.into(), Arc::new(factory));
		self
	}

	/// Construct and initialize the three backends named by `config`.
	pub fn resolve(&self, config: &SecurityConfig, coordination: Arc<dyn Coordination>) -> Result<Handlers, BuildError> {
		let authenticator_factory = self
			.authenticators
			.get(&config.authenticator)
			.ok_or_else(|| BuildError::UnknownAuthenticator(config.authenticator.clone()))?;
		let authorizor_factory = self
			.authorizors
			.get(&config.authorizor)
			.ok_or_else(|| BuildError::UnknownAuthorizor(config.authorizor.clone()))?;
		let permission_factory = self
			.permission_handlers
			.get(&config.permission_handler)
			.ok_or_else(|| BuildError::UnknownPermissionHandler(config.permission_handler.clone()))?;

		let ctx = HandlerContext {
			instance_id: config.instance_id.clone(),
			coordination,
			password_hashing: config.password_hashing,
		};

		let initialize = |name: &str, source: HandlerError| BuildError::Initialize {
			handler: name.to_string(),
			source,
		};

		let authenticator = authenticator_factory(&ctx).map_err(|e| initialize(&config.authenticator, e))?;
		authenticator
			.initialize(&config.instance_id, config.initialize)
			.map_err(|e| initialize(&config.authenticator, e))?;

		let authorizor = authorizor_factory(&ctx).map_err(|e| initialize(&config.authorizor, e))?;
		authorizor.initialize(&config.instance_id, config.initialize).map_err(|e| initialize(&config.authorizor, e))?;

		let permissions = permission_factory(&ctx).map_err(|e| initialize(&config.permission_handler, e))?;
		permissions
			.initialize(&config.instance_id, config.initialize)
			.map_err(|e| initialize(&config.permission_handler, e))?;

		debug!(
			authenticator = %config.authenticator,
			authorizor = %config.authorizor,
			permission_handler = %config.permission_handler,
			"resolved security handlers"
		);

		Ok(Handlers {
			authenticator,
			authorizor,
			permissions,
		})
	}
}
