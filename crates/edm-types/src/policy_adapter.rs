//! Adapter that persists policy values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// The serialized value one admin contributed to a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
	pub admin: Box<str>,
	pub value: String,
}

/// Persisted value of one (user_id, policy code) key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
	/// Serialized merged value
	pub value: String,
	/// Per-admin contributions, oldest first
	#[serde(default)]
	pub contributions: Vec<Contribution>,
}

impl PolicyRecord {
	pub fn contribution(&self, admin: &str) -> Option<&str> {
		self.contributions.iter().find(|c| c.admin.as_ref() == admin).map(|c| c.value.as_str())
	}

	/// Replaces the admin's contribution and moves it to the newest position
	pub fn set_contribution(&mut self, admin: &str, value: String) {
		self.contributions.retain(|c| c.admin.as_ref() != admin);
		self.contributions.push(Contribution { admin: admin.into(), value });
	}

	pub fn take_contribution(&mut self, admin: &str) -> Option<String> {
		let pos = self.contributions.iter().position(|c| c.admin.as_ref() == admin)?;
		Some(self.contributions.remove(pos).value)
	}
}

#[async_trait]
pub trait PolicyAdapter: Debug + Send + Sync {
	async fn read_policy(&self, user_id: UserId, code: PolicyCode) -> EdmResult<Option<PolicyRecord>>;

	/// Writes the record atomically. `None` deletes it.
	async fn write_policy(
		&self,
		user_id: UserId,
		code: PolicyCode,
		record: Option<&PolicyRecord>,
	) -> EdmResult<()>;

	/// Lists the policy codes stored for a user
	async fn list_policies(&self, user_id: UserId) -> EdmResult<Vec<PolicyCode>>;
}


// vim: ts=4
