//! In-memory adapters and abilities for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

use edm_types::ability::SystemAbility;
use edm_types::admin_adapter::{AdminAdapter, AdminRecord};
use edm_types::policy_adapter::{PolicyAdapter, PolicyRecord};

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct MemAdminAdapter {
	admins: Mutex<HashMap<(Box<str>, UserId), AdminRecord>>,
}

impl MemAdminAdapter {
	pub fn is_empty(&self) -> bool {
		self.admins.lock().is_empty()
	}
}

#[async_trait]
impl AdminAdapter for MemAdminAdapter {
	async fn list_admins(&self) -> EdmResult<Vec<AdminRecord>> {
		Ok(self.admins.lock().values().cloned().collect())
	}

	async fn write_admin(&self, admin: &AdminRecord) -> EdmResult<()> {
		self.admins.lock().insert((admin.package_name.clone(), admin.user_id), admin.clone());
		Ok(())
	}

	async fn delete_admin(&self, package_name: &str, user_id: UserId) -> EdmResult<()> {
		self.admins.lock().remove(&(Box::from(package_name), user_id));
		Ok(())
	}
}

#[derive(Debug, Default)]
pub struct MemPolicyAdapter {
	policies: Mutex<BTreeMap<(UserId, PolicyCode), PolicyRecord>>,
}

#[async_trait]
impl PolicyAdapter for MemPolicyAdapter {
	async fn read_policy(&self, user_id: UserId, code: PolicyCode) -> EdmResult<Option<PolicyRecord>> {
		Ok(self.policies.lock().get(&(user_id, code)).cloned())
	}

	async fn write_policy(
		&self,
		user_id: UserId,
		code: PolicyCode,
		record: Option<&PolicyRecord>,
	) -> EdmResult<()> {
		let mut policies = self.policies.lock();
		match record {
			Some(record) => policies.insert((user_id, code), record.clone()),
			None => policies.remove(&(user_id, code)),
		};
		Ok(())
	}

	async fn list_policies(&self, user_id: UserId) -> EdmResult<Vec<PolicyCode>> {
		Ok(self.policies.lock().keys().filter(|(u, _)| *u == user_id).map(|(_, c)| *c).collect())
	}
}

/// Records every call and fails the ones named in `failing`
#[derive(Debug, Default)]
pub struct RecordingAbility {
	pub calls: Mutex<Vec<(String, Vec<PolicyValue>)>>,
	pub failing: Mutex<Vec<&'static str>>,
}

impl RecordingAbility {
	pub fn calls(&self, op: &str) -> Vec<Vec<PolicyValue>> {
		self.calls.lock().iter().filter(|(o, _)| o == op).map(|(_, args)| args.clone()).collect()
	}
}

impl SystemAbility for RecordingAbility {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		self.calls.lock().push((op.to_string(), args.to_vec()));
		if self.failing.lock().contains(&op) {
			return Err(Error::SystemAbnormally(format!("{} failed", op)));
		}
		Ok(None)
	}
}

// vim: ts=4
