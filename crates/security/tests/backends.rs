// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeSet,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use reifydb_security::{
	Authenticator, Authorizations, Authorizor, BuildError, Credential, HandlerError, HandlerRegistry,
	MemoryCoordination, PermissionHandler, Result, SecurityEngine, SecurityErrorCode, SystemPermission,
	TablePermission, Token,
	constants::{NULL_TOKEN, PASSWORD_TOKEN},
	handler::{CoordinatedAuthenticator, InsecurePermissionHandler},
	test_utils::{TEST_INSTANCE, TestInstance, test_config},
};

fn null_credential(user: &str) -> Credential {
	Credential::new(user, TEST_INSTANCE, NULL_TOKEN, Vec::new())
}

#[test]
fn test_insecure_backends_allow_everything() -> Result<()> {
	let instance = TestInstance::with_config(test_config().handlers("insecure"));
	let anyone = null_credential("anyone");

	instance.engine.authenticate(&anyone)?;
	assert!(instance.engine.can_create_table(&anyone)?);
	assert!(instance.engine.can_scan(&anyone, "any-table")?);
	assert!(instance.engine.can_perform_system_actions(&anyone)?);
	assert!(instance.engine.get_authorizations(&anyone)?.is_empty());
	assert!(instance.engine.list_users(&anyone)?.is_empty());
	assert_eq!(instance.engine.token_login_kind(), None);

	instance.engine.create_user(&anyone, &null_credential("someone"), &Authorizations::new(["a"]))?;
	instance.engine.drop_user(&anyone, "someone")?;
	Ok(())
}

#[test]
fn test_insecure_authenticator_accepts_only_null_tokens() {
	let instance = TestInstance::with_config(test_config().handlers("insecure"));
	let password = Credential::new("anyone", TEST_INSTANCE, PASSWORD_TOKEN, b"pw".to_vec());

	let err = instance.engine.authenticate(&password).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::InvalidToken);
}

#[test]
fn test_insecure_backends_still_enforce_policy() {
	let instance = TestInstance::with_config(test_config().handlers("insecure"));
	let anyone = null_credential("anyone");

	let err = instance.engine.can_grant_system(&anyone, "someone", SystemPermission::Grant).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::GrantInvalid);

	let err = instance.engine.can_drop_user(&anyone, "root").unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
}

#[test]
fn test_unknown_backend_name_fails_startup() {
	let config = test_config().permission_handler("ldap");
	match SecurityEngine::build(&config, &HandlerRegistry::with_defaults(), Arc::new(MemoryCoordination::new())) {
		Err(BuildError::UnknownPermissionHandler(name)) => assert_eq!(name, "ldap"),
		Err(err) => panic!("unexpected error: {}", err),
		Ok(_) => panic!("unknown permission handler was accepted"),
	}
}

#[test]
fn test_mixed_backends_fail_startup() {
	let config = test_config().authenticator("insecure").authorizor("insecure");
	let result = SecurityEngine::build(&config, &HandlerRegistry::with_defaults(), Arc::new(MemoryCoordination::new()));
	assert!(matches!(result, Err(BuildError::IncompatibleHandlers { .. })));
}

/// Counts user lifecycle calls reaching the wrapped authenticator.
struct CountingAuthenticator {
	inner: CoordinatedAuthenticator,
	mutations: Arc<AtomicUsize>,
}

impl Authenticator for CountingAuthenticator {
	fn name(&self) -> &'static str {
		self.inner.name()
	}

	fn initialize(&self, instance_id: &str, initialize: bool) -> std::result::Result<(), HandlerError> {
		self.inner.initialize(instance_id, initialize)
	}

	fn valid_security_handlers(&self, authorizor: &dyn Authorizor, permissions: &dyn PermissionHandler) -> bool {
		self.inner.valid_security_handlers(authorizor, permissions)
	}

	fn initialize_security(
		&self,
		credentials: &Credential,
		root: &str,
		token: &[u8],
	) -> std::result::Result<(), HandlerError> {
		self.inner.initialize_security(credentials, root, token)
	}

	fn authenticate_user(&self, principal: &str, token: &Token) -> std::result::Result<bool, HandlerError> {
		self.inner.authenticate_user(principal, token)
	}

	fn list_users(&self) -> std::result::Result<BTreeSet<String>, HandlerError> {
		self.inner.list_users()
	}

	fn create_user(&self, principal: &str, token: &Token) -> std::result::Result<(), HandlerError> {
		self.mutations.fetch_add(1, Ordering::SeqCst);
		self.inner.create_user(principal, token)
	}

	fn drop_user(&self, principal: &str) -> std::result::Result<(), HandlerError> {
		self.mutations.fetch_add(1, Ordering::SeqCst);
		self.inner.drop_user(principal)
	}

	fn change_password(&self, principal: &str, token: &Token) -> std::result::Result<(), HandlerError> {
		self.mutations.fetch_add(1, Ordering::SeqCst);
		self.inner.change_password(principal, token)
	}

	fn user_exists(&self, principal: &str) -> std::result::Result<bool, HandlerError> {
		self.inner.user_exists(principal)
	}

	fn valid_token_kind(&self, kind: &str) -> bool {
		self.inner.valid_token_kind(kind)
	}

	fn token_login_kind(&self) -> Option<&'static str> {
		self.inner.token_login_kind()
	}
}

#[test]
fn test_denied_operations_never_reach_the_backend() -> Result<()> {
	let mutations = Arc::new(AtomicUsize::new(0));
	let counter = mutations.clone();
	let registry = HandlerRegistry::with_defaults().register_authenticator("counting", move |ctx| {
		Ok(Box::new(CountingAuthenticator {
			inner: CoordinatedAuthenticator::new(
				ctx.coordination.clone(),
				ctx.instance_id.clone(),
				ctx.password_hashing,
			)?,
			mutations: counter.clone(),
		}))
	});
	let instance = TestInstance::with_registry(test_config().authenticator("counting"), &registry);

	let alice = instance.create_user("alice", "pw");
	let bob = instance.create_user("bob", "pw");
	let before = mutations.load(Ordering::SeqCst);

	assert!(instance.engine.create_user(&alice, &instance.credential("carol", "pw"), &Authorizations::empty()).is_err());
	assert!(instance.engine.drop_user(&alice, "bob").is_err());
	assert!(instance.engine.change_password(&alice, &instance.credential("bob", "stolen")).is_err());
	assert_eq!(mutations.load(Ordering::SeqCst), before);

	instance.engine.change_password(&bob, &instance.credential("bob", "rotated"))?;
	assert_eq!(mutations.load(Ordering::SeqCst), before + 1);
	Ok(())
}

/// Grants everything but fails table cleanup in the name of another user.
struct FailingCleanup(InsecurePermissionHandler);

impl PermissionHandler for FailingCleanup {
	fn name(&self) -> &'static str {
		"failing-cleanup"
	}

	fn initialize(&self, instance_id: &str, initialize: bool) -> std::result::Result<(), HandlerError> {
		self.0.initialize(instance_id, initialize)
	}

	fn valid_security_handlers(&self, authenticator: &dyn Authenticator, authorizor: &dyn Authorizor) -> bool {
		self.0.valid_security_handlers(authenticator, authorizor)
	}

	fn initialize_security(&self, credentials: &Credential, root: &str) -> std::result::Result<(), HandlerError> {
		self.0.initialize_security(credentials, root)
	}

	fn has_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> std::result::Result<bool, HandlerError> {
		self.0.has_system_permission(principal, permission)
	}

	fn has_cached_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> std::result::Result<bool, HandlerError> {
		self.0.has_cached_system_permission(principal, permission)
	}

	fn has_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> std::result::Result<bool, HandlerError> {
		self.0.has_table_permission(principal, table_id, permission)
	}

	fn has_cached_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> std::result::Result<bool, HandlerError> {
		self.0.has_cached_table_permission(principal, table_id, permission)
	}

	fn grant_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> std::result::Result<(), HandlerError> {
		self.0.grant_system_permission(principal, permission)
	}

	fn revoke_system_permission(
		&self,
		principal: &str,
		permission: SystemPermission,
	) -> std::result::Result<(), HandlerError> {
		self.0.revoke_system_permission(principal, permission)
	}

	fn grant_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> std::result::Result<(), HandlerError> {
		self.0.grant_table_permission(principal, table_id, permission)
	}

	fn revoke_table_permission(
		&self,
		principal: &str,
		table_id: &str,
		permission: TablePermission,
	) -> std::result::Result<(), HandlerError> {
		self.0.revoke_table_permission(principal, table_id, permission)
	}

	fn clean_table_permissions(&self, _table_id: &str) -> std::result::Result<(), HandlerError> {
		Err(HandlerError::security("backend-user", SecurityErrorCode::DefaultSecurityError))
	}

	fn init_user(&self, principal: &str) -> std::result::Result<(), HandlerError> {
		self.0.init_user(principal)
	}

	fn clean_user(&self, principal: &str) -> std::result::Result<(), HandlerError> {
		self.0.clean_user(principal)
	}
}

#[test]
fn test_delete_table_failure_is_attributed_to_caller() {
	let registry = HandlerRegistry::with_defaults()
		.register_permission_handler("failing-cleanup", |_| Ok(Box::new(FailingCleanup(InsecurePermissionHandler))));
	let config = test_config().handlers("insecure").permission_handler("failing-cleanup");
	let instance = TestInstance::with_registry(config, &registry);
	let anyone = null_credential("anyone");

	let err = instance.engine.delete_table(&anyone, "7").unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::DefaultSecurityError);
	assert_eq!(err.principal, "anyone");
}
