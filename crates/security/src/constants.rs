// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Principal used by servers talking to each other.
pub const SYSTEM_PRINCIPAL: &str = "!SYSTEM";

/// Table id of the metadata table.
pub const METADATA_TABLE_ID: &str = "!0";

/// Display name of the metadata table.
pub const METADATA_TABLE_NAME: &str = "!METADATA";

/// Token kind carried by password credentials.
pub const PASSWORD_TOKEN: &str = "password";

/// Token kind carried by credentials of insecure deployments.
pub const NULL_TOKEN: &str = "null";

/// Token kind of the system credential.
pub const SYSTEM_TOKEN: &str = "system";
