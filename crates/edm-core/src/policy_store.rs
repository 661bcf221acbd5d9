//! Policy store
//!
//! Wraps the policy adapter with per-key mutation locks. A SET, REMOVE or admin
//! retraction holds the lock of its (user, code) key for the whole
//! read, merge, external call and persist span, so two mutations of one key never
//! interleave. Reads for GET do not lock.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use edm_types::policy_adapter::{PolicyAdapter, PolicyRecord};

use crate::prelude::*;
use crate::serializer::Serializer;

#[derive(Debug)]
pub struct PolicyStore {
	adapter: Arc<dyn PolicyAdapter>,
	locks: DashMap<(UserId, PolicyCode), Arc<Mutex<()>>>,
}

impl PolicyStore {
	pub fn new(adapter: Arc<dyn PolicyAdapter>) -> Self {
		Self { adapter, locks: DashMap::new() }
	}

	/// Acquires the mutation lock of one key
	pub async fn lock(&self, user_id: UserId, code: PolicyCode) -> OwnedMutexGuard<()> {
		let mutex = self.locks.entry((user_id, code)).or_default().clone();
		mutex.lock_owned().await
	}

	pub async fn read(&self, user_id: UserId, code: PolicyCode) -> EdmResult<Option<PolicyRecord>> {
		self.adapter.read_policy(user_id, code).await
	}

	/// Reads the merged value, or the serializer default when nothing is stored
	pub async fn read_value(
		&self,
		user_id: UserId,
		code: PolicyCode,
		serializer: Serializer,
	) -> EdmResult<PolicyValue> {
		match self.read(user_id, code).await? {
			Some(record) => serializer.deserialize_stored(&record.value),
			None => Ok(serializer.default_value()),
		}
	}

	/// Persists the record. A record without contributions and with a default
	/// value is deleted instead.
	pub async fn write(
		&self,
		user_id: UserId,
		code: PolicyCode,
		record: &PolicyRecord,
		serializer: Serializer,
	) -> EdmResult<()> {
		let default = serializer.serialize(&serializer.default_value())?;
		if record.contributions.is_empty() && record.value == default {
			debug!(%code, %user_id, "Policy emptied, deleting record");
			self.adapter.write_policy(user_id, code, None).await
		} else {
			self.adapter.write_policy(user_id, code, Some(record)).await
		}
	}

	pub async fn list(&self, user_id: UserId) -> EdmResult<Vec<PolicyCode>> {
		self.adapter.list_policies(user_id).await
	}
}


// vim: ts=4
