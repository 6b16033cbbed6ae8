// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_security::{
	Result, SecurityErrorCode, SystemPermission, TablePermission,
	constants::METADATA_TABLE_ID,
	test_utils::{ROOT, TestInstance},
};

const TABLE: &str = "7";

fn instance_with_table() -> TestInstance {
	let instance = TestInstance::new();
	instance.create_table(TABLE, "events");
	instance
}

#[test]
fn test_root_bootstrap_grants() -> Result<()> {
	let instance = TestInstance::new();
	let root = instance.root();

	for permission in SystemPermission::ALL {
		assert!(instance.engine.has_system_permission(&root, ROOT, permission)?);
	}
	for permission in [TablePermission::Read, TablePermission::Write, TablePermission::AlterTable] {
		assert!(instance.engine.has_table_permission(&root, ROOT, METADATA_TABLE_ID, permission)?);
	}
	assert!(!instance.engine.has_table_permission(&root, ROOT, METADATA_TABLE_ID, TablePermission::DropTable)?);
	Ok(())
}

#[test]
fn test_grant_and_revoke_system_permission() -> Result<()> {
	let instance = TestInstance::new();
	let alice = instance.create_user("alice", "pw");

	instance.engine.grant_system_permission(&instance.root(), "alice", SystemPermission::CreateTable)?;
	assert!(instance.engine.can_create_table(&alice)?);
	assert!(instance.engine.has_system_permission(&alice, "alice", SystemPermission::CreateTable)?);

	instance.engine.revoke_system_permission(&instance.root(), "alice", SystemPermission::CreateTable)?;
	assert!(!instance.engine.can_create_table(&alice)?);
	Ok(())
}

#[test]
fn test_grant_system_permission_requires_grant() {
	let instance = TestInstance::new();
	let alice = instance.create_user("alice", "pw");
	instance.create_user("bob", "pw");

	let err = instance.engine.grant_system_permission(&alice, "bob", SystemPermission::CreateTable).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
	assert_eq!(err.principal, "alice");
}

#[test]
fn test_grant_to_missing_user() {
	let instance = instance_with_table();

	let err = instance
		.engine
		.grant_system_permission(&instance.root(), "ghost", SystemPermission::CreateTable)
		.unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::UserDoesntExist);

	let err = instance
		.engine
		.grant_table_permission(&instance.root(), "ghost", TABLE, TablePermission::Read)
		.unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::UserDoesntExist);
}

#[test]
fn test_grant_and_revoke_table_permission() -> Result<()> {
	let instance = instance_with_table();
	let alice = instance.create_user("alice", "pw");

	instance.engine.grant_table_permission(&instance.root(), "alice", TABLE, TablePermission::Read)?;
	assert!(instance.engine.can_scan(&alice, TABLE)?);
	assert!(instance.engine.has_table_permission(&instance.root(), "alice", TABLE, TablePermission::Read)?);

	instance.engine.revoke_table_permission(&instance.root(), "alice", TABLE, TablePermission::Read)?;
	assert!(!instance.engine.can_scan(&alice, TABLE)?);
	Ok(())
}

#[test]
fn test_revoke_on_missing_table() {
	let instance = TestInstance::new();
	instance.create_user("alice", "pw");

	let err = instance
		.engine
		.revoke_table_permission(&instance.root(), "alice", "missing", TablePermission::Read)
		.unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::TableDoesntExist);
	assert_eq!(err.principal, ROOT);
}

#[test]
fn test_grant_on_missing_table() {
	let instance = TestInstance::new();
	instance.create_user("alice", "pw");

	let err = instance
		.engine
		.grant_table_permission(&instance.root(), "alice", "missing", TablePermission::Write)
		.unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::TableDoesntExist);
}

#[test]
fn test_table_grant_permission_delegates_grants() -> Result<()> {
	let instance = instance_with_table();
	let owner = instance.create_user("owner", "pw");
	let reader = instance.create_user("reader", "pw");
	instance.grant_table("owner", TABLE, TablePermission::Grant);

	instance.engine.grant_table_permission(&owner, "reader", TABLE, TablePermission::Read)?;
	assert!(instance.engine.can_scan(&reader, TABLE)?);

	let err = instance.engine.grant_table_permission(&reader, "owner", TABLE, TablePermission::Write).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
	Ok(())
}

#[test]
fn test_delete_table_cleans_grants_of_every_user() -> Result<()> {
	let instance = instance_with_table();
	let alice = instance.create_user("alice", "pw");
	let bob = instance.create_user("bob", "pw");
	instance.grant_table("alice", TABLE, TablePermission::Read);
	instance.grant_table("bob", TABLE, TablePermission::Write);

	instance.engine.delete_table(&instance.root(), TABLE)?;

	assert!(!instance.engine.can_scan(&alice, TABLE)?);
	assert!(!instance.engine.can_write(&bob, TABLE)?);
	Ok(())
}

#[test]
fn test_delete_table_requires_drop_permission() -> Result<()> {
	let instance = instance_with_table();
	let alice = instance.create_user("alice", "pw");
	instance.grant_table("alice", TABLE, TablePermission::Read);

	let err = instance.engine.delete_table(&alice, TABLE).unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
	assert!(instance.engine.can_scan(&alice, TABLE)?);

	instance.grant_table("alice", TABLE, TablePermission::DropTable);
	instance.engine.delete_table(&alice, TABLE)?;
	assert!(!instance.engine.can_scan(&alice, TABLE)?);
	Ok(())
}

#[test]
fn test_initialize_security_is_reserved_for_system() {
	let instance = TestInstance::new();

	let err = instance.engine.initialize_security(&instance.root(), "usurper", b"pw").unwrap_err();
	assert_eq!(err.code, SecurityErrorCode::PermissionDenied);
	assert_eq!(err.principal, ROOT);
}
