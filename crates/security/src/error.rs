// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Wire-visible failure codes of the security layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityErrorCode {
	/// Backend failure that carries no more specific meaning.
	DefaultSecurityError,
	/// The coordination store could not be reached.
	ConnectionError,
	BadCredentials,
	PermissionDenied,
	UserDoesntExist,
	UserExists,
	GrantInvalid,
	InvalidInstanceid,
	InvalidToken,
	TableDoesntExist,
}

impl SecurityErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			SecurityErrorCode::DefaultSecurityError => "DEFAULT_SECURITY_ERROR",
			SecurityErrorCode::ConnectionError => "CONNECTION_ERROR",
			SecurityErrorCode::BadCredentials => "BAD_CREDENTIALS",
			SecurityErrorCode::PermissionDenied => "PERMISSION_DENIED",
			SecurityErrorCode::UserDoesntExist => "USER_DOESNT_EXIST",
			SecurityErrorCode::UserExists => "USER_EXISTS",
			SecurityErrorCode::GrantInvalid => "GRANT_INVALID",
			SecurityErrorCode::InvalidInstanceid => "INVALID_INSTANCEID",
			SecurityErrorCode::InvalidToken => "INVALID_TOKEN",
			SecurityErrorCode::TableDoesntExist => "TABLE_DOESNT_EXIST",
		}
	}

	pub fn description(&self) -> &'static str {
		match self {
			SecurityErrorCode::DefaultSecurityError => "Unknown security exception",
			SecurityErrorCode::ConnectionError => "Connection to the coordination store failed",
			SecurityErrorCode::BadCredentials => "Username or password is invalid",
			SecurityErrorCode::PermissionDenied => "User does not have permission to perform this action",
			SecurityErrorCode::UserDoesntExist => "The user does not exist",
			SecurityErrorCode::UserExists => "The user exists",
			SecurityErrorCode::GrantInvalid => "GRANT permission cannot be granted or revoked",
			SecurityErrorCode::InvalidInstanceid => "The instance id of the credentials is invalid",
			SecurityErrorCode::InvalidToken => "The token kind is not supported by the authenticator",
			SecurityErrorCode::TableDoesntExist => "The table does not exist",
		}
	}
}

impl Display for SecurityErrorCode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Typed failure of an engine operation, always naming the principal that
/// triggered it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error {code} for user {principal} - {}", .code.description())]
pub struct SecurityError {
	pub principal: String,
	pub code: SecurityErrorCode,
}

impl SecurityError {
	pub fn new(principal: impl Into<String>, code: SecurityErrorCode) -> Self {
		Self {
			principal: principal.into(),
			code,
		}
	}

	pub fn permission_denied(principal: impl Into<String>) -> Self {
		Self::new(principal, SecurityErrorCode::PermissionDenied)
	}
}

/// Failure reported by a backend handler or the coordination store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
	#[error("security error {code} for user {principal}")]
	Security {
		principal: String,
		code: SecurityErrorCode,
	},

	#[error("table {table_id} does not exist")]
	TableNotFound {
		table_id: String,
	},

	#[error("coordination store unavailable: {0}")]
	Unavailable(String),

	#[error("internal handler error: {0}")]
	Internal(String),
}

impl HandlerError {
	pub fn security(principal: impl Into<String>, code: SecurityErrorCode) -> Self {
		HandlerError::Security {
			principal: principal.into(),
			code,
		}
	}

	/// Translate into the typed engine failure. Handler errors that already
	/// name a principal keep it; everything else is attributed to `principal`.
	pub fn into_security(self, principal: &str) -> SecurityError {
		match self {
			HandlerError::Security {
				principal,
				code,
			} => SecurityError::new(principal, code),
			HandlerError::TableNotFound {
				..
			} => SecurityError::new(principal, SecurityErrorCode::TableDoesntExist),
			HandlerError::Unavailable(_) => SecurityError::new(principal, SecurityErrorCode::ConnectionError),
			HandlerError::Internal(_) => SecurityError::new(principal, SecurityErrorCode::DefaultSecurityError),
		}
	}

	/// Like [`HandlerError::into_security`], but `principal` carries the
	/// failure even when the backend named someone else.
	pub fn attribute_to(self, principal: &str) -> SecurityError {
		match self {
			HandlerError::Security {
				code,
				..
			} => SecurityError::new(principal, code),
			other => other.into_security(principal),
		}
	}
}

/// Startup failure while assembling the engine. Never recoverable.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error("unknown authenticator '{0}'")]
	UnknownAuthenticator(String),

	#[error("unknown authorizor '{0}'")]
	UnknownAuthorizor(String),

	#[error("unknown permission handler '{0}'")]
	UnknownPermissionHandler(String),

	#[error(
		"{authorizor}, {authenticator}, and {permission_handler} are not compatible with each other; choose authentication and authorization mechanisms that work together"
	)]
	IncompatibleHandlers {
		authenticator: String,
		authorizor: String,
		permission_handler: String,
	},

	#[error("failed to initialize {handler}: {source}")]
	Initialize {
		handler: String,
		#[source]
		source: HandlerError,
	},

	#[error("invalid configuration: {0}")]
	Config(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_security_error_display() {
		let err = SecurityError::new("alice", SecurityErrorCode::PermissionDenied);
		assert_eq!(
			err.to_string(),
			"Error PERMISSION_DENIED for user alice - User does not have permission to perform this action"
		);
	}

	#[test]
	fn test_table_not_found_is_attributed_to_caller() {
		let err = HandlerError::TableNotFound {
			table_id: "42".to_string(),
		}
		.into_security("bob");
		assert_eq!(err, SecurityError::new("bob", SecurityErrorCode::TableDoesntExist));
	}

	#[test]
	fn test_handler_security_error_keeps_its_principal() {
		let err = HandlerError::security("carol", SecurityErrorCode::UserExists).into_security("root");
		assert_eq!(err.principal, "carol");
		assert_eq!(err.code, SecurityErrorCode::UserExists);
	}

	#[test]
	fn test_attribute_to_replaces_the_backend_principal() {
		let err = HandlerError::security("carol", SecurityErrorCode::DefaultSecurityError).attribute_to("root");
		assert_eq!(err, SecurityError::new("root", SecurityErrorCode::DefaultSecurityError));

		let err = HandlerError::Unavailable("down".to_string()).attribute_to("root");
		assert_eq!(err, SecurityError::new("root", SecurityErrorCode::ConnectionError));
	}

	#[test]
	fn test_unavailable_maps_to_connection_error() {
		let err = HandlerError::Unavailable("down".to_string()).into_security("root");
		assert_eq!(err.code, SecurityErrorCode::ConnectionError);
	}

	#[test]
	fn test_code_serializes_as_wire_string() {
		let json = serde_json::to_string(&SecurityErrorCode::InvalidInstanceid).unwrap();
		assert_eq!(json, "\"INVALID_INSTANCEID\"");
		let json = serde_json::to_string(&SecurityErrorCode::TableDoesntExist).unwrap();
		assert_eq!(json, "\"TABLE_DOESNT_EXIST\"");
	}
}
