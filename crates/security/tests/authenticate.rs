// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_security::{
	Credential, Result, SecurityErrorCode, SystemCredentials,
	constants::{NULL_TOKEN, SYSTEM_PRINCIPAL, SYSTEM_TOKEN},
	test_utils::{ROOT, ROOT_PASSWORD, TEST_INSTANCE, TestInstance},
};

fn code<T>(result: Result<T>) -> SecurityErrorCode {
	match result {
		Ok(_) => panic!("expected a security error"),
		Err(err) => err.code,
	}
}

#[test]
fn test_root_authenticates() -> Result<()> {
	let instance = TestInstance::new();
	instance.engine.authenticate(&instance.root())?;
	Ok(())
}

#[test]
fn test_foreign_instance_is_rejected_regardless_of_token() {
	let instance = TestInstance::new();

	let valid_elsewhere = Credential::password(ROOT, "other-instance", ROOT_PASSWORD);
	assert_eq!(code(instance.engine.authenticate(&valid_elsewhere)), SecurityErrorCode::InvalidInstanceid);

	let invalid_elsewhere = Credential::password(ROOT, "other-instance", "wrong");
	assert_eq!(code(instance.engine.authenticate(&invalid_elsewhere)), SecurityErrorCode::InvalidInstanceid);

	let foreign_system = SystemCredentials::derive("other-instance", "DEFAULT").unwrap();
	assert_eq!(
		code(instance.engine.authenticate(foreign_system.credential())),
		SecurityErrorCode::InvalidInstanceid
	);
}

#[test]
fn test_system_credential_authenticates_without_users() -> Result<()> {
	let instance = TestInstance::new();
	instance.engine.authenticate(&instance.system())?;
	Ok(())
}

#[test]
fn test_forged_system_principal_is_rejected() {
	let instance = TestInstance::new();

	let forged = Credential::new(SYSTEM_PRINCIPAL, TEST_INSTANCE, SYSTEM_TOKEN, vec![0u8; 32]);
	assert_eq!(code(instance.engine.authenticate(&forged)), SecurityErrorCode::BadCredentials);

	let wrong_secret = SystemCredentials::derive(TEST_INSTANCE, "guessed").unwrap();
	assert_eq!(code(instance.engine.authenticate(wrong_secret.credential())), SecurityErrorCode::BadCredentials);

	let as_password = Credential::password(SYSTEM_PRINCIPAL, TEST_INSTANCE, "anything");
	assert_eq!(code(instance.engine.authenticate(&as_password)), SecurityErrorCode::BadCredentials);
}

#[test]
fn test_wrong_password_is_rejected() {
	let instance = TestInstance::new();
	let credential = instance.credential(ROOT, "not-the-password");
	let err = instance.engine.authenticate(&credential).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::BadCredentials);
	assert_eq!(err.principal, ROOT);
}

#[test]
fn test_unknown_user_is_rejected() {
	let instance = TestInstance::new();
	let credential = instance.credential("nobody", "whatever");
	assert_eq!(code(instance.engine.authenticate(&credential)), SecurityErrorCode::BadCredentials);
}

#[test]
fn test_unsupported_token_kind_is_rejected() {
	let instance = TestInstance::new();

	let kerberos = Credential::new(ROOT, TEST_INSTANCE, "kerberos", vec![1, 2, 3]);
	assert_eq!(code(instance.engine.authenticate(&kerberos)), SecurityErrorCode::InvalidToken);

	let null = Credential::new(ROOT, TEST_INSTANCE, NULL_TOKEN, Vec::new());
	assert_eq!(code(instance.engine.authenticate(&null)), SecurityErrorCode::InvalidToken);
}

#[test]
fn test_token_login_kind() {
	let instance = TestInstance::new();
	assert_eq!(instance.engine.token_login_kind(), Some("password"));
}

#[test]
fn test_authenticate_user_on_behalf_of_system_actor() -> Result<()> {
	let instance = TestInstance::new();
	let alice = instance.create_user("alice", "alice-pw");

	assert!(instance.engine.authenticate_user(&instance.root(), &alice)?);
	assert!(!instance.engine.authenticate_user(&instance.root(), &instance.credential("alice", "wrong"))?);
	assert!(instance.engine.authenticate_user(&instance.system(), &alice)?);
	Ok(())
}

#[test]
fn test_authenticate_user_about_self() -> Result<()> {
	let instance = TestInstance::new();
	let alice = instance.create_user("alice", "alice-pw");
	assert!(instance.engine.authenticate_user(&alice, &alice)?);
	Ok(())
}

#[test]
fn test_authenticate_user_about_others_requires_system() {
	let instance = TestInstance::new();
	let alice = instance.create_user("alice", "alice-pw");
	let bob = instance.create_user("bob", "bob-pw");

	let err = instance.engine.authenticate_user(&alice, &bob).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
	assert_eq!(err.principal, "alice");
}

#[test]
fn test_coordination_outage_surfaces_connection_error() {
	let instance = TestInstance::new();
	instance.coordination.set_available(false);

	let err = instance.engine.authenticate(&instance.root()).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::ConnectionError);
	assert_eq!(err.principal, ROOT);

	instance.coordination.set_available(true);
	assert!(instance.engine.authenticate(&instance.root()).is_ok());
}
