//! External system abilities a policy handler calls into.
//!
//! The engine does not know what an ability does. It only invokes a named
//! operation with arguments and gets back success or failure plus an optional
//! payload.

use std::fmt::Debug;

use crate::prelude::*;

/// Identifies one external system ability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbilityId(pub u32);

impl AbilityId {
	/// Installer / app runner control
	pub const BUNDLE_MGR: AbilityId = AbilityId(401);
	/// Account constraint store
	pub const ACCOUNT_MGR: AbilityId = AbilityId(200);
	/// Network interface query
	pub const NET_MGR: AbilityId = AbilityId(1151);
	/// Factory reset trigger
	pub const UPDATE_SERVICE: AbilityId = AbilityId(3006);
	/// Device identifiers
	pub const DEVICE_INFO: AbilityId = AbilityId(3902);
	pub const PRINT_SERVICE: AbilityId = AbilityId(3707);
	/// Ability-connection broker
	pub const ABILITY_MGR: AbilityId = AbilityId(180);
}

impl std::fmt::Display for AbilityId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// An external collaborator. Calls are blocking and may fail; the engine never
/// retries them.
pub trait SystemAbility: Debug + Send + Sync {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>>;
}

// vim: ts=4
