//! Policy plugin framework.
//!
//! A plugin is a stateless bundle of a static descriptor and the handlers for
//! one policy code. Plugins receive the current value by reference and never own
//! state. They are registered once at bootstrap into a `PluginRegistry`, which
//! is then frozen before the service accepts requests.

use async_trait::async_trait;
use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use crate::ability_manager::AbilityManager;
use crate::prelude::*;
use crate::serializer::Serializer;

/// How a policy value is kept in the policy store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
	/// Not persisted, GET computes the value live
	Live,
	/// Last accepted value wins
	SingleWriter,
	/// Union of every admin's contribution
	Additive,
}

#[derive(Debug, Clone)]
pub struct PolicyDescriptor {
	pub code: PolicyCode,
	pub name: &'static str,
	/// Permission an admin must have been granted
	pub permission: &'static str,
	pub min_tier: AdminTier,
	pub storage: Storage,
	pub serializer: Serializer,
}

impl PolicyDescriptor {
	pub fn is_additive(&self) -> bool {
		self.storage == Storage::Additive
	}

	pub fn is_persisted(&self) -> bool {
		self.storage != Storage::Live
	}
}

/// Context passed to every handler
#[derive(Debug, Clone, Copy)]
pub struct PluginCtx<'a> {
	pub abilities: &'a AbilityManager,
	pub user_id: UserId,
	/// Package name of the acting (or removed) admin
	pub admin: &'a str,
}

/// Outcome of a mutating handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
	/// `current` holds the value to persist
	Updated,
	/// Empty input, nothing to persist
	Unchanged,
}

#[async_trait]
pub trait PolicyPlugin: Debug + Send + Sync {
	fn descriptor(&self) -> &PolicyDescriptor;

	async fn on_set(
		&self,
		_ctx: &PluginCtx<'_>,
		_data: PolicyValue,
		_current: &mut PolicyValue,
	) -> EdmResult<Change> {
		Err(Error::OperationNotSupported)
	}

	/// Returns the value to reply with. Live policies ignore `current` and query
	/// the owning subsystem.
	async fn on_get(
		&self,
		_ctx: &PluginCtx<'_>,
		current: PolicyValue,
		_arg: Option<&str>,
	) -> EdmResult<PolicyValue> {
		Ok(current)
	}

	async fn on_remove(
		&self,
		_ctx: &PluginCtx<'_>,
		_data: PolicyValue,
		_current: &mut PolicyValue,
	) -> EdmResult<Change> {
		Err(Error::OperationNotSupported)
	}

	/// Called while an admin is removed. `current` already holds the value the
	/// remaining admins retain; `lifted` is what the removed admin alone held.
	async fn on_admin_remove(
		&self,
		_ctx: &PluginCtx<'_>,
		_lifted: &PolicyValue,
		_current: &mut PolicyValue,
	) -> EdmResult<()> {
		Ok(())
	}

	/// Best-effort notification after the retraction was persisted
	async fn on_admin_remove_done(&self, _ctx: &PluginCtx<'_>, _lifted: &PolicyValue) -> EdmResult<()> {
		Ok(())
	}
}

// Registry //
//**********//
#[derive(Debug, Default)]
pub struct PluginRegistry {
	plugins: BTreeMap<PolicyCode, Arc<dyn PolicyPlugin>>,
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a plugin. A duplicate policy code is a bootstrap error.
	pub fn register(&mut self, plugin: Arc<dyn PolicyPlugin>) -> EdmResult<()> {
		let desc = plugin.descriptor();
		if let Some(existing) = self.plugins.get(&desc.code) {
			return Err(Error::ConfigError(format!(
				"Policy code {} of '{}' is already registered by '{}'",
				desc.code,
				desc.name,
				existing.descriptor().name
			)));
		}

		debug!("Registering policy plugin: {} ({})", desc.name, desc.code);
		self.plugins.insert(desc.code, plugin);
		Ok(())
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenPluginRegistry {
		info!("Freezing plugin registry with {} plugins", self.plugins.len());
		FrozenPluginRegistry { plugins: self.plugins }
	}

	pub fn len(&self) -> usize {
		self.plugins.len()
	}

	pub fn is_empty(&self) -> bool {
		self.plugins.is_empty()
	}
}

/// Immutable registry stored in AppState
#[derive(Debug)]
pub struct FrozenPluginRegistry {
	plugins: BTreeMap<PolicyCode, Arc<dyn PolicyPlugin>>,
}

impl FrozenPluginRegistry {
	pub fn get(&self, code: PolicyCode) -> Option<&Arc<dyn PolicyPlugin>> {
		self.plugins.get(&code)
	}

	/// All plugins ordered by policy code
	pub fn list(&self) -> impl Iterator<Item = &Arc<dyn PolicyPlugin>> {
		self.plugins.values()
	}

	pub fn len(&self) -> usize {
		self.plugins.len()
	}

	pub fn is_empty(&self) -> bool {
		self.plugins.is_empty()
	}
}


// vim: ts=4
