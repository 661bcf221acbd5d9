//! App state type

use std::{sync::Arc, time::Duration};

use edm_types::worker::WorkerPool;

use crate::ability_manager::AbilityManager;
use crate::admin::AdminManager;
use crate::conn_manager::AdminConnManager;
use crate::permission::PermissionCatalog;
use crate::plugin::FrozenPluginRegistry;
use crate::policy_store::PolicyStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct AppState {
	pub opts: AppBuilderOpts,
	pub worker: Arc<WorkerPool>,

	pub permissions: Arc<PermissionCatalog>,
	pub admins: AdminManager,
	pub plugins: FrozenPluginRegistry,
	pub policies: PolicyStore,
	pub abilities: AbilityManager,
	pub conn: AdminConnManager,
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	/// Bound of the inbound request channel
	pub request_queue: usize,
	/// Push admin enable/disable events to the admin's entry point
	pub notify_admin_ability: bool,
	/// Worker threads: (high only, high + medium, all priorities)
	pub workers: (usize, usize, usize),
	/// Upper bound for each plugin hook run while an admin is removed
	pub hook_timeout: Duration,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			request_queue: 64,
			notify_admin_ability: true,
			workers: (1, 2, 1),
			hook_timeout: Duration::from_secs(10),
		}
	}
}

// vim: ts=4
