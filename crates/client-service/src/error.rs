// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use reifydb_security::{HandlerError, SecurityError};
use serde::{Deserialize, Serialize};

/// Operation a table-scoped call was performing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableOperation {
	Permission,
	GetConfiguration,
}

impl Display for TableOperation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			TableOperation::Permission => f.write_str("PERMISSION"),
			TableOperation::GetConfiguration => f.write_str("GET_CONFIGURATION"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOperationErrorKind {
	NotFound,
	Exists,
	Other,
}

impl TableOperationErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			TableOperationErrorKind::NotFound => "NOTFOUND",
			TableOperationErrorKind::Exists => "EXISTS",
			TableOperationErrorKind::Other => "OTHER",
		}
	}
}

/// Failure of a facade call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
	#[error(transparent)]
	Security(#[from] SecurityError),

	#[error("table {table} failed {operation}: {}", .kind.as_str())]
	TableOperation {
		table: String,
		operation: TableOperation,
		kind: TableOperationErrorKind,
	},

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl ServiceError {
	pub fn table_not_found(table: impl Into<String>, operation: TableOperation) -> Self {
		ServiceError::TableOperation {
			table: table.into(),
			operation,
			kind: TableOperationErrorKind::NotFound,
		}
	}
}

impl From<HandlerError> for ServiceError {
	fn from(e: HandlerError) -> Self {
		ServiceError::Internal(e.to_string())
	}
}

/// Serializable error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
	/// Machine-readable error code.
	pub code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub principal: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub table: Option<String>,
	/// Human-readable error message.
	pub message: String,
}

impl From<ServiceError> for WireError {
	fn from(e: ServiceError) -> Self {
		let message = e.to_string();
		match e {
			ServiceError::Security(err) => WireError {
				code: err.code.as_str().to_string(),
				principal: Some(err.principal),
				table: None,
				message,
			},
			ServiceError::TableOperation {
				table,
				kind,
				..
			} => WireError {
				code: kind.as_str().to_string(),
				principal: None,
				table: Some(table),
				message,
			},
			ServiceError::InvalidArgument(_) => WireError {
				code: "INVALID_ARGUMENT".to_string(),
				principal: None,
				table: None,
				message,
			},
			ServiceError::Internal(_) => WireError {
				code: "INTERNAL".to_string(),
				principal: None,
				table: None,
				message,
			},
		}
	}
}
