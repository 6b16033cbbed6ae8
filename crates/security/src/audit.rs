// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Audit trail of security decisions.
//!
//! Every record names the acting principal and the attempted action. Records
//! are emitted on the `reifydb::audit` target so they can be routed apart
//! from diagnostic logs.

use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::error::SecurityError;

pub const AUDIT_TARGET: &str = "reifydb::audit";

/// Record the outcome of a mutating operation.
pub fn operation<T>(principal: &str, action: &str, detail: impl Display, result: &Result<T, SecurityError>) {
	match result {
		Ok(_) => info!(
			target: AUDIT_TARGET,
			principal,
			action,
			detail = %detail,
			outcome = "success",
			"security operation succeeded"
		),
		Err(err) => failure(principal, action, detail, err),
	}
}

/// Record the outcome of a permission predicate.
pub fn check(principal: &str, action: &str, detail: impl Display, result: &Result<bool, SecurityError>) {
	match result {
		Ok(allowed) => debug!(
			target: AUDIT_TARGET,
			principal,
			action,
			detail = %detail,
			outcome = if *allowed { "allowed" } else { "denied" },
			"security check evaluated"
		),
		Err(err) => failure(principal, action, detail, err),
	}
}

pub fn failure(principal: &str, action: &str, detail: impl Display, err: &SecurityError) {
	warn!(
		target: AUDIT_TARGET,
		principal,
		action,
		detail = %detail,
		outcome = "failure",
		code = err.code.as_str(),
		"{}",
		err
	);
}
