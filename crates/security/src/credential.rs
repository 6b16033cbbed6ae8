// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Debug, Formatter};

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{
	constants::{NULL_TOKEN, PASSWORD_TOKEN, SYSTEM_PRINCIPAL, SYSTEM_TOKEN},
	error::BuildError,
};

/// Identity presented by a caller: principal, the instance it believes it is
/// talking to, and an opaque token of a named kind.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
	principal: String,
	instance_id: String,
	token_kind: String,
	token: Vec<u8>,
}

impl Credential {
	pub fn new(
		principal: impl Into<String>,
		instance_id: impl Into<String>,
		token_kind: impl Into<String>,
		token: impl Into<Vec<u8>>,
	) -> Self {
		Self {
			principal: principal.into(),
			instance_id: instance_id.into(),
			token_kind: token_kind.into(),
			token: token.into(),
		}
	}

	pub fn password(
		principal: impl Into<String>,
		instance_id: impl Into<String>,
		password: impl Into<Vec<u8>>,
	) -> Self {
		Self::new(principal, instance_id, PASSWORD_TOKEN, password)
	}

	pub fn principal(&self) -> &str {
		&self.principal
	}

	pub fn instance_id(&self) -> &str {
		&self.instance_id
	}

	pub fn token_kind(&self) -> &str {
		&self.token_kind
	}

	pub fn token(&self) -> &[u8] {
		&self.token
	}
}

impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credential")
			.field("principal", &self.principal)
			.field("instance_id", &self.instance_id)
			.field("token_kind", &self.token_kind)
			.field("token", &"<redacted>")
			.finish()
	}
}

/// Backend token rebuilt from a credential after the authenticator accepted
/// its kind.
#[derive(Clone, PartialEq, Eq)]
pub enum Token {
	Password(Vec<u8>),
	Null,
}

impl Token {
	pub fn from_credential(credential: &Credential) -> Option<Self> {
		match credential.token_kind() {
			PASSWORD_TOKEN => Some(Token::Password(credential.token().to_vec())),
			NULL_TOKEN => Some(Token::Null),
			_ => None,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Token::Password(_) => PASSWORD_TOKEN,
			Token::Null => NULL_TOKEN,
		}
	}
}

impl Debug for Token {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Token::Password(_) => f.write_str("Password(<redacted>)"),
			Token::Null => f.write_str("Null"),
		}
	}
}

/// The credential servers of one instance use to talk to each other.
///
/// Derived from the instance secret, so every server of the instance derives
/// the same bytes without exchanging them.
#[derive(Clone)]
pub struct SystemCredentials {
	credential: Credential,
}

impl SystemCredentials {
	pub fn derive(instance_id: &str, secret: &str) -> Result<Self, BuildError> {
		let salt = format!("reifydb:{}", instance_id);
		let mut token = [0u8; 32];
		let params = Params::new(1024, 1, 1, Some(token.len()))
			.map_err(|e| BuildError::Config(format!("unable to derive system credentials: {}", e)))?;
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
			.hash_password_into(secret.as_bytes(), salt.as_bytes(), &mut token)
			.map_err(|e| BuildError::Config(format!("unable to derive system credentials: {}", e)))?;

		Ok(Self {
			credential: Credential::new(SYSTEM_PRINCIPAL, instance_id, SYSTEM_TOKEN, token.to_vec()),
		})
	}

	pub fn credential(&self) -> &Credential {
		&self.credential
	}

	/// Constant-time comparison against a presented credential.
	pub fn matches(&self, other: &Credential) -> bool {
		let expected = &self.credential;
		let same_identity = expected.principal == other.principal
			&& expected.instance_id == other.instance_id
			&& expected.token_kind == other.token_kind;
		let same_token: bool = expected.token.as_slice().ct_eq(other.token.as_slice()).into();
		same_identity & same_token
	}
}

impl Debug for SystemCredentials {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SystemCredentials").field("credential", &self.credential).finish()
	}
}
