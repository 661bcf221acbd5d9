//! Notifies an admin application's entry point about lifecycle events.

use edm_types::ability::AbilityId;
use edm_types::worker::Priority;

use crate::ability_manager::AbilityManager;
use crate::prelude::*;

pub const ON_ADMIN_ENABLED: i64 = 1;
pub const ON_ADMIN_DISABLED: i64 = 2;

#[derive(Debug)]
pub struct AdminConnManager {
	enabled: bool,
}

impl AdminConnManager {
	pub fn new(enabled: bool) -> Self {
		Self { enabled }
	}

	/// Connects to `package/ability` of `user_id` and delivers `event`.
	/// Best effort: failures are logged and reported as `false`.
	pub async fn connect_ability(
		&self,
		abilities: &AbilityManager,
		package_name: &str,
		ability_name: &str,
		event: i64,
		user_id: UserId,
	) -> bool {
		if !self.enabled {
			return false;
		}
		info!(admin = %package_name, event, "Connecting admin ability");

		let args = vec![
			PolicyValue::String(package_name.to_string()),
			PolicyValue::String(ability_name.to_string()),
			PolicyValue::Int(event),
			PolicyValue::Int(i64::from(user_id.0)),
		];
		match abilities.invoke_with(Priority::Low, AbilityId::ABILITY_MGR, "connect_ability", args).await {
			Ok(_) => true,
			Err(err) => {
				warn!(admin = %package_name, "Connecting admin ability failed: {}", err);
				false
			}
		}
	}
}


// vim: ts=4
