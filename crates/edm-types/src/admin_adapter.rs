//! Adapter that persists the admin table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::{AdminIdentity, EntInfo};

/// One persisted admin, unique per (package_name, user_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
	pub package_name: Box<str>,
	pub ability_name: Box<str>,
	pub user_id: UserId,
	pub tier: AdminTier,
	#[serde(default)]
	pub ent_info: EntInfo,
	/// Granted permissions (already filtered against the catalog)
	#[serde(default)]
	pub permissions: Vec<Box<str>>,
	/// Monotonic insertion sequence, preserves registration order across restarts
	pub seq: u64,
	pub created_at: Timestamp,
}

impl AdminRecord {
	pub fn identity(&self) -> AdminIdentity {
		AdminIdentity::new(self.package_name.clone(), self.ability_name.clone())
	}

	pub fn has_permission(&self, permission: &str) -> bool {
		self.permissions.iter().any(|p| p.as_ref() == permission)
	}
}

#[async_trait]
pub trait AdminAdapter: Debug + Send + Sync {
	/// Lists every stored admin across all users
	async fn list_admins(&self) -> EdmResult<Vec<AdminRecord>>;

	/// Creates or replaces the record for (package_name, user_id)
	async fn write_admin(&self, admin: &AdminRecord) -> EdmResult<()>;

	/// Deletes the record. Deleting a missing record is not an error.
	async fn delete_admin(&self, package_name: &str, user_id: UserId) -> EdmResult<()>;
}

// vim: ts=4
