//! Forbids creating local OS accounts.

use async_trait::async_trait;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

const CREATE_DIRECTLY: &str = "constraint.os.account.create.directly";

#[derive(Debug)]
pub struct DisallowAddLocalAccountPlugin {
	desc: PolicyDescriptor,
}

impl DisallowAddLocalAccountPlugin {
	pub fn new() -> Self {
		Self {
			desc: PolicyDescriptor {
				code: codes::DISALLOW_ADD_LOCAL_ACCOUNT,
				name: "disallow_add_local_account",
				permission: permissions::SET_ACCOUNT_POLICY,
				min_tier: AdminTier::Enterprise,
				storage: Storage::SingleWriter,
				serializer: Serializer::Bool,
			},
		}
	}

	async fn set_constraint(ctx: &PluginCtx<'_>, disallow: bool) -> EdmResult<()> {
		let args = vec![PolicyValue::String(CREATE_DIRECTLY.into()), PolicyValue::Bool(disallow)];
		ctx.abilities.invoke(AbilityId::ACCOUNT_MGR, "set_global_constraints", args).await?;
		Ok(())
	}
}

impl Default for DisallowAddLocalAccountPlugin {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PolicyPlugin for DisallowAddLocalAccountPlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_set(
		&self,
		ctx: &PluginCtx<'_>,
		data: PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<Change> {
		let disallow = data.as_bool().ok_or_else(|| Error::ParamError("bool expected".into()))?;
		Self::set_constraint(ctx, disallow).await?;
		*current = data;
		Ok(Change::Updated)
	}

	/// Re-applies the value the remaining admins retain
	async fn on_admin_remove(
		&self,
		ctx: &PluginCtx<'_>,
		lifted: &PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<()> {
		if *lifted == *current {
			return Ok(());
		}
		let disallow = current.as_bool().unwrap_or_default();
		Self::set_constraint(ctx, disallow).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::{ScriptedAbility, abilities, ctx};
	use std::sync::Arc;

	#[tokio::test]
	async fn test_set_applies_constraint() {
		let ability = Arc::new(ScriptedAbility::default());
		let mgr = abilities(AbilityId::ACCOUNT_MGR, ability.clone());
		let plugin = DisallowAddLocalAccountPlugin::new();

		let mut current = PolicyValue::Bool(false);
		plugin.on_set(&ctx(&mgr), PolicyValue::Bool(true), &mut current).await.expect("set");
		assert_eq!(current, PolicyValue::Bool(true));
		assert_eq!(ability.calls("set_global_constraints")[0][1], PolicyValue::Bool(true));
	}

	#[tokio::test]
	async fn test_admin_remove_lifts_constraint() {
		let ability = Arc::new(ScriptedAbility::default());
		let mgr = abilities(AbilityId::ACCOUNT_MGR, ability.clone());
		let plugin = DisallowAddLocalAccountPlugin::new();

		// nobody else retains the constraint
		let mut current = PolicyValue::Bool(false);
		plugin.on_admin_remove(&ctx(&mgr), &PolicyValue::Bool(true), &mut current).await.expect("remove");
		assert_eq!(ability.calls("set_global_constraints")[0][1], PolicyValue::Bool(false));

		// removed admin never disallowed anything
		plugin.on_admin_remove(&ctx(&mgr), &PolicyValue::Bool(false), &mut current).await.expect("remove");
		assert_eq!(ability.calls("set_global_constraints").len(), 1);
	}

	#[tokio::test]
	async fn test_failed_constraint_is_system_abnormally() {
		let ability = Arc::new(ScriptedAbility::default());
		ability.fail("set_global_constraints");
		let mgr = abilities(AbilityId::ACCOUNT_MGR, ability);
		let plugin = DisallowAddLocalAccountPlugin::new();

		let mut current = PolicyValue::Bool(false);
		let res = plugin.on_set(&ctx(&mgr), PolicyValue::Bool(true), &mut current).await;
		assert!(matches!(res, Err(Error::SystemAbnormally(_))));
		assert_eq!(current, PolicyValue::Bool(false));
	}
}

// vim: ts=4
