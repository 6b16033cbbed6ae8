// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Deployment-wide capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemPermission {
	/// Never granted or revoked through the system permission path.
	Grant,
	CreateTable,
	DropTable,
	AlterTable,
	CreateUser,
	DropUser,
	AlterUser,
	System,
}

impl SystemPermission {
	pub const ALL: [SystemPermission; 8] = [
		SystemPermission::Grant,
		SystemPermission::CreateTable,
		SystemPermission::DropTable,
		SystemPermission::AlterTable,
		SystemPermission::CreateUser,
		SystemPermission::DropUser,
		SystemPermission::AlterUser,
		SystemPermission::System,
	];

	/// Stable wire id.
	pub fn id(&self) -> u8 {
		match self {
			SystemPermission::Grant => 0,
			SystemPermission::CreateTable => 1,
			SystemPermission::DropTable => 2,
			SystemPermission::AlterTable => 3,
			SystemPermission::CreateUser => 4,
			SystemPermission::DropUser => 5,
			SystemPermission::AlterUser => 6,
			SystemPermission::System => 7,
		}
	}

	pub fn from_id(id: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|p| p.id() == id)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SystemPermission::Grant => "GRANT",
			SystemPermission::CreateTable => "CREATE_TABLE",
			SystemPermission::DropTable => "DROP_TABLE",
			SystemPermission::AlterTable => "ALTER_TABLE",
			SystemPermission::CreateUser => "CREATE_USER",
			SystemPermission::DropUser => "DROP_USER",
			SystemPermission::AlterUser => "ALTER_USER",
			SystemPermission::System => "SYSTEM",
		}
	}
}

/// Capability scoped to a single table id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TablePermission {
	Read,
	Write,
	BulkImport,
	AlterTable,
	Grant,
	DropTable,
}

impl TablePermission {
	pub const ALL: [TablePermission; 6] = [
		TablePermission::Read,
		TablePermission::Write,
		TablePermission::BulkImport,
		TablePermission::AlterTable,
		TablePermission::Grant,
		TablePermission::DropTable,
	];

	/// Stable wire id. Ids 0 and 1 are retired.
	pub fn id(&self) -> u8 {
		match self {
			TablePermission::Read => 2,
			TablePermission::Write => 3,
			TablePermission::BulkImport => 4,
			TablePermission::AlterTable => 5,
			TablePermission::Grant => 6,
			TablePermission::DropTable => 7,
		}
	}

	pub fn from_id(id: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|p| p.id() == id)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TablePermission::Read => "READ",
			TablePermission::Write => "WRITE",
			TablePermission::BulkImport => "BULK_IMPORT",
			TablePermission::AlterTable => "ALTER_TABLE",
			TablePermission::Grant => "GRANT",
			TablePermission::DropTable => "DROP_TABLE",
		}
	}
}

impl Display for SystemPermission {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Display for TablePermission {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SystemPermission {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|p| p.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown system permission '{}'", s))
	}
}

impl FromStr for TablePermission {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|p| p.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown table permission '{}'", s))
	}
}

/// Encodes a permission set as sorted, deduplicated wire ids.
pub(crate) fn encode_ids(ids: impl IntoIterator<Item = u8>) -> Vec<u8> {
	let mut ids: Vec<u8> = ids.into_iter().collect();
	ids.sort_unstable();
	ids.dedup();
	ids
}
