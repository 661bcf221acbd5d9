//! App builder: configuration, bootstrap and startup of the service.

use std::{collections::HashMap, sync::Arc, time::Duration};

use edm_core::admin::AdminManager;
use edm_core::conn_manager::AdminConnManager;
use edm_core::permission::PermissionCatalog;
use edm_core::policy_store::PolicyStore;
use edm_core::{PluginRegistry, PolicyPlugin};
use edm_types::ability::{AbilityId, SystemAbility};
use edm_types::admin_adapter::AdminAdapter;
use edm_types::policy_adapter::PolicyAdapter;
use edm_types::worker::WorkerPool;

use crate::prelude::*;
use crate::transport::{self, ServiceHandle};
pub use edm_core::ability_manager::AbilityManager;
pub use edm_core::app::{App, AppBuilderOpts, AppState, VERSION};

pub struct Adapters {
	pub admin_adapter: Option<Arc<dyn AdminAdapter>>,
	pub policy_adapter: Option<Arc<dyn PolicyAdapter>>,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	worker: Option<Arc<WorkerPool>>,
	adapters: Adapters,
	abilities: HashMap<AbilityId, Arc<dyn SystemAbility>>,
	permissions: Vec<(Box<str>, AdminTier)>,
	plugins: Vec<Arc<dyn PolicyPlugin>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// a subscriber may already be installed (tests build several apps)
		let _ignore = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			worker: None,
			adapters: Adapters { admin_adapter: None, policy_adapter: None },
			abilities: HashMap::new(),
			permissions: Vec::new(),
			plugins: Vec::new(),
		}
	}

	pub fn request_queue(&mut self, request_queue: usize) -> &mut Self {
		self.opts.request_queue = request_queue;
		self
	}
	pub fn notify_admin_ability(&mut self, notify: bool) -> &mut Self {
		self.opts.notify_admin_ability = notify;
		self
	}
	pub fn workers(&mut self, high: usize, med: usize, low: usize) -> &mut Self {
		self.opts.workers = (high, med, low);
		self
	}
	pub fn worker(&mut self, worker: Arc<WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}
	pub fn hook_timeout(&mut self, hook_timeout: Duration) -> &mut Self {
		self.opts.hook_timeout = hook_timeout;
		self
	}

	pub fn admin_adapter(&mut self, admin_adapter: Arc<dyn AdminAdapter>) -> &mut Self {
		self.adapters.admin_adapter = Some(admin_adapter);
		self
	}
	pub fn policy_adapter(&mut self, policy_adapter: Arc<dyn PolicyAdapter>) -> &mut Self {
		self.adapters.policy_adapter = Some(policy_adapter);
		self
	}

	/// Provides the external collaborator behind `id`
	pub fn ability(&mut self, id: AbilityId, ability: Arc<dyn SystemAbility>) -> &mut Self {
		self.abilities.insert(id, ability);
		self
	}

	/// Adds a catalog permission beyond the ones the plugins require
	pub fn permission(&mut self, name: impl Into<Box<str>>, min_tier: AdminTier) -> &mut Self {
		self.permissions.push((name.into(), min_tier));
		self
	}

	/// Registers an additional policy plugin next to the built-in ones
	pub fn plugin(&mut self, plugin: Arc<dyn PolicyPlugin>) -> &mut Self {
		self.plugins.push(plugin);
		self
	}

	/// Bootstraps the app state. Every plugin is registered and the registry is
	/// frozen before this returns.
	pub async fn build(self) -> EdmResult<App> {
		info!("EDM policy service V{}", VERSION);

		let Some(admin_adapter) = self.adapters.admin_adapter else {
			error!("FATAL: No admin adapter configured");
			return Err(Error::ConfigError("No admin adapter configured".into()));
		};
		let Some(policy_adapter) = self.adapters.policy_adapter else {
			error!("FATAL: No policy adapter configured");
			return Err(Error::ConfigError("No policy adapter configured".into()));
		};
		if self.opts.request_queue == 0 {
			return Err(Error::ConfigError("request_queue must be at least 1".into()));
		}

		let mut registry = PluginRegistry::new();
		edm_plugins::register_plugins(&mut registry)?;
		for plugin in self.plugins {
			registry.register(plugin)?;
		}
		let plugins = registry.freeze();

		let permissions = Arc::new(PermissionCatalog::new());
		for plugin in plugins.list() {
			let desc = plugin.descriptor();
			permissions.add_permission(desc.permission, desc.min_tier);
		}
		for (name, min_tier) in &self.permissions {
			permissions.add_permission(name, *min_tier);
		}

		let admins = AdminManager::load(admin_adapter, permissions.clone()).await?;

		let worker = self.worker.unwrap_or_else(|| {
			let (high, med, low) = self.opts.workers;
			Arc::new(WorkerPool::new(high, med, low))
		});
		let abilities = AbilityManager::new(worker.clone(), self.abilities);
		for id in [AbilityId::BUNDLE_MGR, AbilityId::ACCOUNT_MGR, AbilityId::NET_MGR, AbilityId::ABILITY_MGR] {
			if !abilities.has_ability(id) {
				warn!(ability = %id, "System ability not configured");
			}
		}

		let app: App = Arc::new(AppState {
			worker,
			permissions,
			admins,
			plugins,
			policies: PolicyStore::new(policy_adapter),
			abilities,
			conn: AdminConnManager::new(self.opts.notify_admin_ability),
			opts: self.opts,
		});
		info!("Registered {} policy plugins", app.plugins.len());

		Ok(app)
	}

	/// Builds the app and starts serving requests
	pub async fn start(self) -> EdmResult<(App, ServiceHandle)> {
		let app = self.build().await?;
		let (handle, rx) = transport::channel(app.opts.request_queue);
		tokio::spawn(transport::serve(app.clone(), rx));
		info!("Serving requests (queue {})", app.opts.request_queue);
		Ok((app, handle))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
