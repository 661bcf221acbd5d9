//! Permission catalog
//!
//! Every permission an admin may request is registered here together with the
//! lowest admin tier allowed to hold it. The catalog stays writable at runtime.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct PermissionCatalog {
	permissions: RwLock<HashMap<Box<str>, AdminTier>>,
}

impl PermissionCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a permission. A duplicate keeps the first registration and
	/// returns `false`.
	pub fn add_permission(&self, name: &str, min_tier: AdminTier) -> bool {
		let mut permissions = self.permissions.write();
		if permissions.contains_key(name) {
			debug!("Permission {} already registered", name);
			return false;
		}
		permissions.insert(name.into(), min_tier);
		true
	}

	/// Subset of `requested` known to the catalog and allowed for `tier`.
	/// Unknown identifiers are dropped.
	pub fn filter<S: AsRef<str>>(&self, requested: &[S], tier: AdminTier) -> Vec<Box<str>> {
		let permissions = self.permissions.read();
		let mut granted: Vec<Box<str>> = Vec::new();
		for req in requested {
			let req = req.as_ref();
			let allowed = permissions.get(req).is_some_and(|min_tier| tier >= *min_tier);
			if allowed && !granted.iter().any(|g| g.as_ref() == req) {
				granted.push(req.into());
			}
		}
		granted
	}

	/// Subset of `requested` known to the catalog, regardless of tier
	pub fn get_req_permission<S: AsRef<str>>(&self, requested: &[S]) -> Vec<Box<str>> {
		self.filter(requested, AdminTier::Super)
	}

	/// Whether every requested identifier is known but held above `tier`
	pub fn all_restricted<S: AsRef<str>>(&self, requested: &[S], tier: AdminTier) -> bool {
		let permissions = self.permissions.read();
		!requested.is_empty()
			&& requested.iter().all(|req| {
				permissions.get(req.as_ref()).is_some_and(|min_tier| tier < *min_tier)
			})
	}

	pub fn check<S: AsRef<str>>(&self, required: &str, granted: &[S]) -> bool {
		granted.iter().any(|g| g.as_ref() == required)
	}
}


// vim: ts=4
