// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_security::Credential;

use crate::error::ServiceError;

/// Executes bulk loads on behalf of the bulk transaction `tid`.
///
/// The facade only gates access; loading the files and tracking which
/// transactions are still running is up to the implementation.
pub trait BulkImporter: Send + Sync {
	/// Load `files` into `table_id`, returning the files that could not be
	/// loaded. Unloadable files are moved to `error_dir`.
	fn bulk_import(
		&self,
		credentials: &Credential,
		tid: u64,
		table_id: &str,
		files: &[String],
		error_dir: &str,
		set_time: bool,
	) -> Result<Vec<String>, ServiceError>;

	fn is_active(&self, tid: u64) -> bool;
}
