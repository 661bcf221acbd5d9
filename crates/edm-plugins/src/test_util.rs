//! Scripted system ability for plugin tests

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

use edm_core::ability_manager::AbilityManager;
use edm_types::ability::SystemAbility;
use edm_types::worker::WorkerPool;

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct ScriptedAbility {
	pub calls: Mutex<Vec<(String, Vec<PolicyValue>)>>,
	pub replies: Mutex<HashMap<&'static str, PolicyValue>>,
	pub failing: Mutex<Vec<&'static str>>,
}

impl ScriptedAbility {
	pub fn reply(&self, op: &'static str, value: PolicyValue) {
		self.replies.lock().insert(op, value);
	}

	pub fn fail(&self, op: &'static str) {
		self.failing.lock().push(op);
	}

	pub fn calls(&self, op: &str) -> Vec<Vec<PolicyValue>> {
		self.calls.lock().iter().filter(|(o, _)| o == op).map(|(_, a)| a.clone()).collect()
	}
}

impl SystemAbility for ScriptedAbility {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		self.calls.lock().push((op.to_string(), args.to_vec()));
		if self.failing.lock().iter().any(|f| *f == op) {
			return Err(Error::SystemAbnormally(format!("{} failed", op)));
		}
		Ok(self.replies.lock().get(op).cloned())
	}
}

pub fn abilities(id: AbilityId, ability: Arc<ScriptedAbility>) -> AbilityManager {
	let mut map: HashMap<AbilityId, Arc<dyn SystemAbility>> = HashMap::new();
	map.insert(id, ability);
	AbilityManager::new(Arc::new(WorkerPool::new(1, 1, 1)), map)
}

pub fn ctx(abilities: &AbilityManager) -> PluginCtx<'_> {
	PluginCtx { abilities, user_id: UserId::DEFAULT, admin: "com.edm.test.demo" }
}

pub fn arr(items: &[&str]) -> PolicyValue {
	PolicyValue::StringArray(items.iter().map(ToString::to_string).collect())
}

// vim: ts=4
