//! Disables printing.

use async_trait::async_trait;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

#[derive(Debug)]
pub struct DisabledPrinterPlugin {
	desc: PolicyDescriptor,
}

impl DisabledPrinterPlugin {
	pub fn new() -> Self {
		Self {
			desc: PolicyDescriptor {
				code: codes::DISABLED_PRINTER,
				name: "disabled_printer",
				permission: permissions::RESTRICT_POLICY,
				min_tier: AdminTier::Enterprise,
				storage: Storage::SingleWriter,
				serializer: Serializer::Bool,
			},
		}
	}
}

impl Default for DisabledPrinterPlugin {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PolicyPlugin for DisabledPrinterPlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_set(
		&self,
		ctx: &PluginCtx<'_>,
		data: PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<Change> {
		ctx.abilities.invoke(AbilityId::PRINT_SERVICE, "set_printer_disabled", vec![data.clone()]).await?;
		*current = data;
		Ok(Change::Updated)
	}

	/// Pushes the value the remaining admins retain to the print service
	async fn on_admin_remove(
		&self,
		ctx: &PluginCtx<'_>,
		lifted: &PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<()> {
		if *lifted == *current {
			return Ok(());
		}
		ctx.abilities.invoke(AbilityId::PRINT_SERVICE, "set_printer_disabled", vec![current.clone()]).await?;
		Ok(())
	}
}


// vim: ts=4
