//! Shared fixtures for service tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};
use tempfile::TempDir;

use edm::ability::{AbilityId, SystemAbility};
use edm::prelude::*;
use edm::request::{EdmRequest, EdmResponse, PolicyRequest};
use edm::types::{AdminIdentity, EntInfo, FuncOperateType};
use edm::{App, AppBuilder, ServiceHandle};
use edm_store_adapter_fs::StoreAdapterFs;

pub const ABILITY: &str = "EnterpriseAdminAbility";
pub const NORMAL_PERMISSION: &str = "ohos.permission.ENTERPRISE_NORMAL_DEMO";

/// Mock system ability: records calls, answers from a script
#[derive(Debug, Default)]
pub struct MockAbility {
	calls: Mutex<Vec<(String, Vec<PolicyValue>)>>,
	replies: Mutex<HashMap<String, PolicyValue>>,
	failing: Mutex<Vec<String>>,
	stalled: Mutex<HashMap<String, Duration>>,
}

impl MockAbility {
	pub fn reply(&self, op: &str, value: PolicyValue) {
		self.replies.lock().insert(op.to_string(), value);
	}

	pub fn fail(&self, op: &str) {
		self.failing.lock().push(op.to_string());
	}

	/// Blocks the calling worker thread on every call of `op`
	pub fn stall(&self, op: &str, duration: Duration) {
		self.stalled.lock().insert(op.to_string(), duration);
	}

	pub fn calls(&self, op: &str) -> Vec<Vec<PolicyValue>> {
		self.calls.lock().iter().filter(|(o, _)| o == op).map(|(_, a)| a.clone()).collect()
	}
}

impl SystemAbility for MockAbility {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		self.calls.lock().push((op.to_string(), args.to_vec()));
		let stall = self.stalled.lock().get(op).copied();
		if let Some(duration) = stall {
			std::thread::sleep(duration);
		}
		if self.failing.lock().iter().any(|f| f == op) {
			return Err(Error::SystemAbnormally(format!("{} failed", op)));
		}
		Ok(self.replies.lock().get(op).cloned())
	}
}

/// Every collaborator the built-in plugins talk to
#[derive(Debug, Default)]
pub struct MockSystem {
	pub bundle: Arc<MockAbility>,
	pub account: Arc<MockAbility>,
	pub net: Arc<MockAbility>,
	pub update: Arc<MockAbility>,
	pub device_info: Arc<MockAbility>,
	pub printer: Arc<MockAbility>,
	pub ability_mgr: Arc<MockAbility>,
}

impl MockSystem {
	pub fn new() -> Arc<Self> {
		let system = Self::default();
		system.device_info.reply("get_serial", PolicyValue::String("SN-20261016".into()));
		system.device_info.reply("get_display_version", PolicyValue::String("EDM 4.1.0".into()));
		system.device_info.reply("get_device_name", PolicyValue::String("test-device".into()));
		system.net.reply(
			"get_all_interfaces",
			PolicyValue::StringArray(vec!["eth0".into(), "wlan0".into()]),
		);
		system.net.reply("get_ip_address", PolicyValue::String("192.168.1.10".into()));
		system.net.reply("get_mac", PolicyValue::String("aa:bb:cc:dd:ee:ff".into()));
		Arc::new(system)
	}

	pub fn install(&self, builder: &mut AppBuilder) {
		let abilities: [(AbilityId, &Arc<MockAbility>); 7] = [
			(AbilityId::BUNDLE_MGR, &self.bundle),
			(AbilityId::ACCOUNT_MGR, &self.account),
			(AbilityId::NET_MGR, &self.net),
			(AbilityId::UPDATE_SERVICE, &self.update),
			(AbilityId::DEVICE_INFO, &self.device_info),
			(AbilityId::PRINT_SERVICE, &self.printer),
			(AbilityId::ABILITY_MGR, &self.ability_mgr),
		];
		for (id, ability) in abilities {
			builder.ability(id, ability.clone());
		}
	}
}

pub async fn create_app_at(dir: &Path, system: &MockSystem) -> (App, ServiceHandle) {
	let store = Arc::new(StoreAdapterFs::new(dir.into()).await.expect("Failed to create store"));
	let mut builder = AppBuilder::new();
	builder
		.admin_adapter(store.clone())
		.policy_adapter(store)
		.workers(1, 2, 1)
		.hook_timeout(Duration::from_secs(1))
		.permission(NORMAL_PERMISSION, AdminTier::Normal);
	system.install(&mut builder);
	builder.start().await.expect("Failed to start app")
}

pub async fn create_app() -> (App, ServiceHandle, Arc<MockSystem>, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let system = MockSystem::new();
	let (app, handle) = create_app_at(temp_dir.path(), &system).await;
	(app, handle, system, temp_dir)
}

pub fn identity(package_name: &str) -> AdminIdentity {
	AdminIdentity::new(package_name, ABILITY)
}

pub async fn enable(
	handle: &ServiceHandle,
	package_name: &str,
	tier: AdminTier,
	permissions: &[&str],
) -> EdmResponse {
	enable_for(handle, package_name, tier, permissions, UserId::DEFAULT).await
}

pub async fn enable_for(
	handle: &ServiceHandle,
	package_name: &str,
	tier: AdminTier,
	permissions: &[&str],
	user_id: UserId,
) -> EdmResponse {
	handle
		.call(EdmRequest::EnableAdmin {
			admin: identity(package_name),
			ent_info: EntInfo::new("ACME Corp", "integration test"),
			tier,
			permissions: permissions.iter().map(ToString::to_string).collect(),
			user_id,
		})
		.await
		.expect("enable admin call")
}

pub async fn disable(handle: &ServiceHandle, package_name: &str) -> EdmResponse {
	handle
		.call(EdmRequest::DisableAdmin { admin: identity(package_name), user_id: UserId::DEFAULT })
		.await
		.expect("disable admin call")
}

pub async fn policy(
	handle: &ServiceHandle,
	package_name: &str,
	op: FuncOperateType,
	code: PolicyCode,
	payload: Option<&str>,
) -> EdmResponse {
	handle
		.policy(PolicyRequest {
			code,
			op,
			admin: identity(package_name),
			user_id: UserId::DEFAULT,
			payload: payload.map(ToString::to_string),
			arg: None,
		})
		.await
		.expect("policy call")
}

pub async fn set(handle: &ServiceHandle, package_name: &str, code: PolicyCode, payload: &str) -> EdmResponse {
	policy(handle, package_name, FuncOperateType::Set, code, Some(payload)).await
}

pub async fn remove(
	handle: &ServiceHandle,
	package_name: &str,
	code: PolicyCode,
	payload: &str,
) -> EdmResponse {
	policy(handle, package_name, FuncOperateType::Remove, code, Some(payload)).await
}

/// GET that must succeed, returns the serialized value
pub async fn get(handle: &ServiceHandle, package_name: &str, code: PolicyCode) -> String {
	let res = policy(handle, package_name, FuncOperateType::Get, code, None).await;
	assert_eq!(res.status, ErrCode::Ok, "GET {} by {}", code, package_name);
	res.result.unwrap_or_default()
}

pub fn arr(items: &[&str]) -> PolicyValue {
	PolicyValue::StringArray(items.iter().map(ToString::to_string).collect())
}

// vim: ts=4
