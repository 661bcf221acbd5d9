//! Admin registry
//!
//! Owns the admin table. Every operation, reads included, takes the same lock,
//! and writes hold it across the adapter call so the in-memory table and the
//! store never diverge.

use std::sync::Arc;
use tokio::sync::Mutex;

use edm_types::admin_adapter::{AdminAdapter, AdminRecord};
use edm_types::types::{AdminIdentity, EntInfo, validate_package_name};

use crate::permission::PermissionCatalog;
use crate::prelude::*;

#[derive(Debug, Default)]
struct AdminTable {
	/// Ordered by `seq`
	admins: Vec<AdminRecord>,
	next_seq: u64,
}

impl AdminTable {
	fn position(&self, package_name: &str, user_id: UserId) -> Option<usize> {
		self.admins
			.iter()
			.position(|a| a.package_name.as_ref() == package_name && a.user_id == user_id)
	}

	/// Position of the admin matching both package and ability name
	fn resolve(&self, identity: &AdminIdentity, user_id: UserId) -> Option<usize> {
		self.position(&identity.package_name, user_id)
			.filter(|pos| self.admins[*pos].ability_name == identity.ability_name)
	}
}

#[derive(Debug)]
pub struct AdminManager {
	adapter: Arc<dyn AdminAdapter>,
	permissions: Arc<PermissionCatalog>,
	table: Mutex<AdminTable>,
}

impl AdminManager {
	/// Loads the stored admins. Stored permissions are filtered again against the
	/// current catalog.
	pub async fn load(
		adapter: Arc<dyn AdminAdapter>,
		permissions: Arc<PermissionCatalog>,
	) -> EdmResult<Self> {
		let mut admins = adapter.list_admins().await?;
		admins.sort_by_key(|a| a.seq);
		for admin in &mut admins {
			admin.permissions = permissions.filter(&admin.permissions, admin.tier);
		}
		let next_seq = admins.last().map_or(0, |a| a.seq + 1);
		info!("Loaded {} admins", admins.len());

		Ok(Self { adapter, permissions, table: Mutex::new(AdminTable { admins, next_seq }) })
	}

	/// Registers a new admin for (package, user)
	pub async fn set_admin_value<S: AsRef<str>>(
		&self,
		identity: &AdminIdentity,
		ent_info: &EntInfo,
		tier: AdminTier,
		requested: &[S],
		user_id: UserId,
	) -> EdmResult<()> {
		validate_package_name(&identity.package_name)?;
		let mut table = self.table.lock().await;

		if table.position(&identity.package_name, user_id).is_some() {
			warn!(admin = %identity.package_name, %user_id, "Admin already registered");
			return Err(Error::AlreadyExists);
		}
		if tier == AdminTier::Super && table.admins.iter().any(|a| a.tier == AdminTier::Super) {
			warn!(admin = %identity.package_name, "A super admin already exists");
			return Err(Error::AlreadyExists);
		}

		let permissions = self.permissions.filter(requested, tier);
		if tier == AdminTier::Normal
			&& permissions.is_empty()
			&& self.permissions.all_restricted(requested, tier)
		{
			warn!(admin = %identity.package_name, "Normal admin requested only elevated permissions");
			return Err(Error::PermissionDenied);
		}

		let record = AdminRecord {
			package_name: identity.package_name.clone(),
			ability_name: identity.ability_name.clone(),
			user_id,
			tier,
			ent_info: if tier == AdminTier::Normal { EntInfo::default() } else { ent_info.clone() },
			permissions,
			seq: table.next_seq,
			created_at: Timestamp::now(),
		};
		self.adapter.write_admin(&record).await?;

		info!(admin = %record.package_name, %user_id, %tier, "Admin registered");
		table.next_seq += 1;
		table.admins.push(record);
		Ok(())
	}

	/// Replaces the granted permissions of an existing admin
	pub async fn update_admin<S: AsRef<str>>(
		&self,
		identity: &AdminIdentity,
		requested: &[S],
		user_id: UserId,
	) -> EdmResult<()> {
		let mut table = self.table.lock().await;
		let Some(pos) = table.resolve(identity, user_id) else {
			return Err(Error::AdminNotFound);
		};

		let mut record = table.admins[pos].clone();
		record.permissions = self.permissions.filter(requested, record.tier);
		self.adapter.write_admin(&record).await?;

		debug!(admin = %record.package_name, %user_id, "Admin permissions updated");
		table.admins[pos] = record;
		Ok(())
	}

	/// Removes the record and returns it. A missing record is not an error.
	pub async fn delete_admin(
		&self,
		identity: &AdminIdentity,
		user_id: UserId,
	) -> EdmResult<Option<AdminRecord>> {
		let mut table = self.table.lock().await;
		let Some(pos) = table.resolve(identity, user_id) else {
			return Ok(None);
		};

		self.adapter.delete_admin(&identity.package_name, user_id).await?;
		let record = table.admins.remove(pos);
		info!(admin = %record.package_name, %user_id, "Admin removed");
		Ok(Some(record))
	}

	/// Admins of a user in registration order
	pub async fn get_admin_by_user_id(&self, user_id: UserId) -> Vec<AdminRecord> {
		let table = self.table.lock().await;
		table.admins.iter().filter(|a| a.user_id == user_id).cloned().collect()
	}

	/// Looks up an admin by its full identity
	pub async fn get_admin(&self, identity: &AdminIdentity, user_id: UserId) -> Option<AdminRecord> {
		let table = self.table.lock().await;
		table.resolve(identity, user_id).map(|pos| table.admins[pos].clone())
	}

	/// Whether this exact registration is still current. A record deleted and
	/// registered again under the same name is a different registration.
	pub async fn is_registered(&self, admin: &AdminRecord) -> bool {
		let table = self.table.lock().await;
		table
			.position(&admin.package_name, admin.user_id)
			.is_some_and(|pos| table.admins[pos].seq == admin.seq)
	}

	pub async fn get_admin_by_pkg_name(
		&self,
		package_name: &str,
		user_id: UserId,
	) -> Option<AdminRecord> {
		let table = self.table.lock().await;
		table.position(package_name, user_id).map(|pos| table.admins[pos].clone())
	}

	pub async fn is_super_admin(&self, package_name: &str) -> bool {
		let table = self.table.lock().await;
		table
			.admins
			.iter()
			.any(|a| a.package_name.as_ref() == package_name && a.tier == AdminTier::Super)
	}

	pub async fn is_super_admin_exist(&self) -> bool {
		let table = self.table.lock().await;
		table.admins.iter().any(|a| a.tier == AdminTier::Super)
	}

	/// Requested permissions known to the catalog, regardless of tier
	pub fn get_req_permission<S: AsRef<str>>(&self, requested: &[S]) -> Vec<Box<str>> {
		self.permissions.get_req_permission(requested)
	}
}


// vim: ts=4
