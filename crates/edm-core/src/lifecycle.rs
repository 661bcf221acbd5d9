//! Admin lifecycle operations: enable, disable, update and queries.

use edm_types::types::{AdminIdentity, EntInfo};

use crate::app::AppState;
use crate::conn_manager::{ON_ADMIN_DISABLED, ON_ADMIN_ENABLED};
use crate::dispatch;
use crate::prelude::*;

pub async fn enable_admin<S: AsRef<str>>(
	app: &AppState,
	identity: &AdminIdentity,
	ent_info: &EntInfo,
	tier: AdminTier,
	permissions: &[S],
	user_id: UserId,
) -> EdmResult<()> {
	app.admins.set_admin_value(identity, ent_info, tier, permissions, user_id).await?;
	app.conn
		.connect_ability(
			&app.abilities,
			&identity.package_name,
			&identity.ability_name,
			ON_ADMIN_ENABLED,
			user_id,
		)
		.await;
	Ok(())
}

/// Deletes the admin, then retracts its policy contributions. Policy requests
/// from the admin fail from the moment the record is gone.
pub async fn disable_admin(app: &AppState, identity: &AdminIdentity, user_id: UserId) -> EdmResult<()> {
	let Some(admin) = app.admins.delete_admin(identity, user_id).await? else {
		warn!(admin = %identity.package_name, %user_id, "Disable of unknown admin");
		return Err(Error::AdminNotFound);
	};

	dispatch::remove_admin_policies(app, &admin).await;

	app.conn
		.connect_ability(
			&app.abilities,
			&admin.package_name,
			&admin.ability_name,
			ON_ADMIN_DISABLED,
			user_id,
		)
		.await;
	Ok(())
}

pub async fn update_admin<S: AsRef<str>>(
	app: &AppState,
	identity: &AdminIdentity,
	permissions: &[S],
	user_id: UserId,
) -> EdmResult<()> {
	app.admins.update_admin(identity, permissions, user_id).await
}

pub async fn is_admin_enabled(app: &AppState, identity: &AdminIdentity, user_id: UserId) -> bool {
	app.admins.get_admin(identity, user_id).await.is_some()
}

pub async fn get_enterprise_info(
	app: &AppState,
	identity: &AdminIdentity,
	user_id: UserId,
) -> EdmResult<EntInfo> {
	app.admins.get_admin(identity, user_id).await.map(|a| a.ent_info).ok_or(Error::AdminNotFound)
}

// vim: ts=4
