// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Record-level visibility labels held by a user.
///
/// Labels are opaque bytes; the security layer stores and returns them but
/// never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizations {
	labels: BTreeSet<Vec<u8>>,
}

impl Authorizations {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn new<I, L>(labels: I) -> Self
	where
		I: IntoIterator<Item = L>,
		L: Into<Vec<u8>>,
	{
		Self {
			labels: labels.into_iter().map(Into::into).collect(),
		}
	}

	pub fn contains(&self, label: &[u8]) -> bool {
		self.labels.contains(label)
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
		self.labels.iter().map(Vec::as_slice)
	}

	pub fn into_labels(self) -> Vec<Vec<u8>> {
		self.labels.into_iter().collect()
	}
}

impl<L: Into<Vec<u8>>> FromIterator<L> for Authorizations {
	fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
		Self::new(iter)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_labels_are_deduplicated() {
		let auths = Authorizations::new(["A", "B", "A"]);
		assert_eq!(auths.len(), 2);
		assert!(auths.contains(b"A"));
		assert!(!auths.contains(b"C"));
	}

	#[test]
	fn test_into_labels_is_sorted() {
		let auths: Authorizations = vec![b"z".to_vec(), b"a".to_vec()].into_iter().collect();
		assert_eq!(auths.into_labels(), vec![b"a".to_vec(), b"z".to_vec()]);
	}
}
