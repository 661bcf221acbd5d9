//! Broker for external system abilities. Calls are blocking, so each one runs on
//! the worker pool instead of the async runtime.

use std::{collections::HashMap, sync::Arc};

use edm_types::ability::{AbilityId, SystemAbility};
use edm_types::worker::{Priority, WorkerPool};

use crate::prelude::*;

#[derive(Debug)]
pub struct AbilityManager {
	abilities: HashMap<AbilityId, Arc<dyn SystemAbility>>,
	worker: Arc<WorkerPool>,
}

impl AbilityManager {
	pub fn new(worker: Arc<WorkerPool>, abilities: HashMap<AbilityId, Arc<dyn SystemAbility>>) -> Self {
		Self { abilities, worker }
	}

	pub fn has_ability(&self, id: AbilityId) -> bool {
		self.abilities.contains_key(&id)
	}

	pub async fn invoke(
		&self,
		id: AbilityId,
		op: &'static str,
		args: Vec<PolicyValue>,
	) -> EdmResult<Option<PolicyValue>> {
		self.invoke_with(Priority::Medium, id, op, args).await
	}

	pub async fn invoke_with(
		&self,
		priority: Priority,
		id: AbilityId,
		op: &'static str,
		args: Vec<PolicyValue>,
	) -> EdmResult<Option<PolicyValue>> {
		let Some(ability) = self.abilities.get(&id).cloned() else {
			error!(ability = %id, op, "System ability not available");
			return Err(Error::SystemAbnormally(format!("ability {} not available", id)));
		};

		let res = self.worker.try_spawn(priority, move || ability.invoke(op, &args)).await;
		if let Err(err) = &res {
			error!(ability = %id, op, "System ability call failed: {}", err);
		}
		res
	}
}


// vim: ts=4
