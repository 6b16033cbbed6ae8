// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, thread};

use reifydb_security::{
	Coordination, HandlerRegistry, SecurityEngine, SystemPermission, TablePermission,
	coordination::paths,
	test_utils::{ROOT, TEST_INSTANCE, TestInstance, test_config},
};

const TABLE: &str = "1";

#[test]
fn test_shared_engine_answers_from_many_threads() {
	let instance = TestInstance::new();
	instance.create_table(TABLE, "orders");
	let alice = instance.create_user("alice", "pw");
	instance.grant_table("alice", TABLE, TablePermission::Read);

	// a second engine that has not looked up the root user yet
	let engine = Arc::new(
		SecurityEngine::build(
			&test_config().initialize(false),
			&HandlerRegistry::with_defaults(),
			instance.coordination.clone(),
		)
		.unwrap(),
	);
	let root = instance.root();

	thread::scope(|scope| {
		for _ in 0..8 {
			let engine = engine.clone();
			let root = &root;
			let alice = &alice;
			scope.spawn(move || {
				for _ in 0..4 {
					assert!(engine.can_scan(alice, TABLE).unwrap());
					assert!(!engine.can_write(alice, TABLE).unwrap());
					assert!(!engine.can_create_table(alice).unwrap());
					assert!(engine.can_create_table(root).unwrap());
					assert!(engine.can_grant_system(root, "alice", SystemPermission::CreateTable).unwrap());
					assert_eq!(engine.root_username().unwrap().as_deref(), Some(ROOT));
				}
			});
		}
	});

	// the root name stays memoized
	instance.coordination.put(&paths::root_user(TEST_INSTANCE), b"someone-else".to_vec()).unwrap();
	assert_eq!(engine.root_username().unwrap().as_deref(), Some(ROOT));
}
