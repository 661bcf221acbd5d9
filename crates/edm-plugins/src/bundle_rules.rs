//! Bundle control rules: disallowed install, uninstall and running bundles.
//!
//! All three are additive string-array policies capped at `ARRAY_MAX_SIZE`
//! entries. The installer subsystem is always told the requested delta, never
//! the merged list, and the merged value is only kept once it accepted the delta.

use async_trait::async_trait;

use edm_core::serializer::ARRAY_MAX_SIZE;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
	DisallowedInstall,
	DisallowedUninstall,
	DisallowedRunning,
}

impl RuleKind {
	pub fn as_str(self) -> &'static str {
		match self {
			RuleKind::DisallowedInstall => "disallowed_install",
			RuleKind::DisallowedUninstall => "disallowed_uninstall",
			RuleKind::DisallowedRunning => "disallowed_running",
		}
	}
}

#[derive(Debug)]
pub struct BundleRulePlugin {
	desc: PolicyDescriptor,
	kind: RuleKind,
}

impl BundleRulePlugin {
	fn new(code: PolicyCode, name: &'static str, permission: &'static str, kind: RuleKind) -> Self {
		Self {
			desc: PolicyDescriptor {
				code,
				name,
				permission,
				min_tier: AdminTier::Enterprise,
				storage: Storage::Additive,
				serializer: Serializer::StringArray,
			},
			kind,
		}
	}

	pub fn disallowed_install() -> Self {
		Self::new(
			codes::DISALLOWED_INSTALL_BUNDLES,
			"disallowed_install_bundles",
			permissions::SET_BUNDLE_INSTALL_POLICY,
			RuleKind::DisallowedInstall,
		)
	}

	pub fn disallowed_uninstall() -> Self {
		Self::new(
			codes::DISALLOWED_UNINSTALL_BUNDLES,
			"disallowed_uninstall_bundles",
			permissions::SET_BUNDLE_INSTALL_POLICY,
			RuleKind::DisallowedUninstall,
		)
	}

	pub fn disallowed_running() -> Self {
		Self::new(
			codes::DISALLOW_RUNNING_BUNDLES,
			"disallow_running_bundles",
			permissions::MANAGE_APP_RUNNING,
			RuleKind::DisallowedRunning,
		)
	}

	pub fn kind(&self) -> RuleKind {
		self.kind
	}

	async fn call(&self, ctx: &PluginCtx<'_>, op: &'static str, bundles: &PolicyValue) -> EdmResult<()> {
		let args = vec![
			PolicyValue::String(self.kind.as_str().to_string()),
			bundles.clone(),
			PolicyValue::Int(i64::from(ctx.user_id.0)),
		];
		ctx.abilities.invoke(AbilityId::BUNDLE_MGR, op, args).await?;
		Ok(())
	}
}

#[async_trait]
impl PolicyPlugin for BundleRulePlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_set(
		&self,
		ctx: &PluginCtx<'_>,
		data: PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<Change> {
		if data.is_empty() {
			return Ok(Change::Unchanged);
		}
		let merged = Serializer::StringArray.set_union(current, &data)?;
		if merged.as_string_array().map_or(0, <[String]>::len) > ARRAY_MAX_SIZE {
			warn!(code = %self.desc.code, admin = ctx.admin, "Bundle rule list exceeds {} entries", ARRAY_MAX_SIZE);
			return Err(Error::ParamError(format!("more than {} bundles", ARRAY_MAX_SIZE)));
		}

		self.call(ctx, "add_control_rules", &data).await?;
		*current = merged;
		Ok(Change::Updated)
	}

	async fn on_remove(
		&self,
		ctx: &PluginCtx<'_>,
		data: PolicyValue,
		current: &mut PolicyValue,
	) -> EdmResult<Change> {
		if data.is_empty() {
			return Ok(Change::Unchanged);
		}
		let merged = Serializer::StringArray.set_difference(current, &data)?;

		self.call(ctx, "delete_control_rules", &data).await?;
		*current = merged;
		Ok(Change::Updated)
	}

	async fn on_admin_remove_done(&self, ctx: &PluginCtx<'_>, lifted: &PolicyValue) -> EdmResult<()> {
		if lifted.is_empty() {
			return Ok(());
		}
		debug!(code = %self.desc.code, admin = ctx.admin, "Lifting bundle rules of removed admin");
		self.call(ctx, "delete_control_rules", lifted).await
	}
}


// vim: ts=4
