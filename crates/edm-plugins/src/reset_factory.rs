//! Factory reset. Only the super admin may trigger it; nothing is persisted.

use async_trait::async_trait;

use edm_types::worker::Priority;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

#[derive(Debug)]
pub struct ResetFactoryPlugin {
	desc: PolicyDescriptor,
}

impl ResetFactoryPlugin {
	pub fn new() -> Self {
		Self {
			desc: PolicyDescriptor {
				code: codes::RESET_FACTORY,
				name: "reset_factory",
				permission: permissions::RESET_DEVICE,
				min_tier: AdminTier::Super,
				storage: Storage::Live,
				serializer: Serializer::String,
			},
		}
	}
}

impl Default for ResetFactoryPlugin {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PolicyPlugin for ResetFactoryPlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_set(
		&self,
		ctx: &PluginCtx<'_>,
		_data: PolicyValue,
		_current: &mut PolicyValue,
	) -> EdmResult<Change> {
		warn!(admin = ctx.admin, "Factory reset requested");
		ctx.abilities
			.invoke_with(Priority::High, AbilityId::UPDATE_SERVICE, "factory_reset", Vec::new())
			.await?;
		Ok(Change::Updated)
	}

	async fn on_get(
		&self,
		_ctx: &PluginCtx<'_>,
		_current: PolicyValue,
		_arg: Option<&str>,
	) -> EdmResult<PolicyValue> {
		Err(Error::OperationNotSupported)
	}
}

// vim: ts=4
