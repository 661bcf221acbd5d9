//! Redb-based store adapter
//!
//! Implements both the admin and the policy adapter on a single redb file.
//!
//! # Storage Layout
//!
//! - `admins` - admin records as JSON, keyed by `{user_id}/{package_name}`
//! - `policies` - policy records as JSON, keyed by `{user_id}/{code}`
//!
//! Every write is one redb transaction. Database calls run on the blocking
//! thread pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use tracing::{debug, info, warn};

use edm_types::admin_adapter::{AdminAdapter, AdminRecord};
use edm_types::policy_adapter::{PolicyAdapter, PolicyRecord};
use edm_types::prelude::{EdmResult, PolicyCode, UserId};

mod error;
pub use error::Error;
use error::from_redb_error;

const TABLE_ADMINS: TableDefinition<&str, &str> = TableDefinition::new("admins");
const TABLE_POLICIES: TableDefinition<&str, &str> = TableDefinition::new("policies");

fn admin_key(user_id: UserId, package_name: &str) -> String {
	format!("{}/{}", user_id, package_name)
}

fn policy_key(user_id: UserId, code: PolicyCode) -> String {
	format!("{}/{}", user_id, code)
}

pub struct StoreAdapterRedb {
	db: Arc<redb::Database>,
}

impl StoreAdapterRedb {
	/// Opens (or creates) the database file and its tables
	pub async fn new(path: &Path) -> Result<Self, Error> {
		let path = path.to_path_buf();
		let db = tokio::task::spawn_blocking(move || {
			let db = redb::Database::create(&path).map_err(from_redb_error)?;
			let tx = db.begin_write().map_err(from_redb_error)?;
			tx.open_table(TABLE_ADMINS).map_err(from_redb_error)?;
			tx.open_table(TABLE_POLICIES).map_err(from_redb_error)?;
			tx.commit().map_err(from_redb_error)?;
			info!("redb store at {:?}", &path);
			Ok::<_, Error>(db)
		})
		.await??;

		Ok(Self { db: Arc::new(db) })
	}

	async fn get(
		&self,
		table: TableDefinition<'static, &'static str, &'static str>,
		key: String,
	) -> Result<Option<String>, Error> {
		let db = Arc::clone(&self.db);
		tokio::task::spawn_blocking(move || {
			let tx = db.begin_read().map_err(from_redb_error)?;
			let table = tx.open_table(table).map_err(from_redb_error)?;
			let value = table.get(key.as_str()).map_err(from_redb_error)?;
			Ok::<_, Error>(value.map(|v| v.value().to_string()))
		})
		.await?
	}

	/// Inserts `value` under `key`, or removes the key when `value` is `None`
	async fn put(
		&self,
		table: TableDefinition<'static, &'static str, &'static str>,
		key: String,
		value: Option<String>,
	) -> Result<(), Error> {
		let db = Arc::clone(&self.db);
		tokio::task::spawn_blocking(move || {
			let tx = db.begin_write().map_err(from_redb_error)?;
			{
				let mut table = tx.open_table(table).map_err(from_redb_error)?;
				match value {
					Some(value) => {
						table.insert(key.as_str(), value.as_str()).map_err(from_redb_error)?;
					}
					None => {
						table.remove(key.as_str()).map_err(from_redb_error)?;
					}
				}
			}
			tx.commit().map_err(from_redb_error)
		})
		.await?
	}

	/// Lists `(key, value)` pairs whose key starts with `prefix`
	async fn scan(
		&self,
		table: TableDefinition<'static, &'static str, &'static str>,
		prefix: String,
	) -> Result<Vec<(String, String)>, Error> {
		let db = Arc::clone(&self.db);
		tokio::task::spawn_blocking(move || {
			let tx = db.begin_read().map_err(from_redb_error)?;
			let table = tx.open_table(table).map_err(from_redb_error)?;
			let mut res = Vec::new();
			for item in table.range(prefix.as_str()..).map_err(from_redb_error)? {
				let (key, value) = item.map_err(from_redb_error)?;
				if !key.value().starts_with(&prefix) {
					break;
				}
				res.push((key.value().to_string(), value.value().to_string()));
			}
			Ok::<_, Error>(res)
		})
		.await?
	}
}

#[async_trait]
impl AdminAdapter for StoreAdapterRedb {
	async fn list_admins(&self) -> EdmResult<Vec<AdminRecord>> {
		let mut res = Vec::new();
		for (key, value) in self.scan(TABLE_ADMINS, String::new()).await? {
			match serde_json::from_str::<AdminRecord>(&value) {
				Ok(admin) => res.push(admin),
				Err(err) => warn!("skipping unreadable admin record {}: {}", key, err),
			}
		}
		debug!("loaded {} admin records", res.len());
		Ok(res)
	}

	async fn write_admin(&self, admin: &AdminRecord) -> EdmResult<()> {
		let value = serde_json::to_string(admin).map_err(Error::from)?;
		self.put(TABLE_ADMINS, admin_key(admin.user_id, &admin.package_name), Some(value)).await?;
		Ok(())
	}

	async fn delete_admin(&self, package_name: &str, user_id: UserId) -> EdmResult<()> {
		self.put(TABLE_ADMINS, admin_key(user_id, package_name), None).await?;
		Ok(())
	}
}

#[async_trait]
impl PolicyAdapter for StoreAdapterRedb {
	async fn read_policy(&self, user_id: UserId, code: PolicyCode) -> EdmResult<Option<PolicyRecord>> {
		let Some(value) = self.get(TABLE_POLICIES, policy_key(user_id, code)).await? else {
			return Ok(None);
		};
		let record = serde_json::from_str(&value).map_err(Error::from)?;
		Ok(Some(record))
	}

	async fn write_policy(
		&self,
		user_id: UserId,
		code: PolicyCode,
		record: Option<&PolicyRecord>,
	) -> EdmResult<()> {
		let value = record.map(serde_json::to_string).transpose().map_err(Error::from)?;
		self.put(TABLE_POLICIES, policy_key(user_id, code), value).await?;
		Ok(())
	}

	async fn list_policies(&self, user_id: UserId) -> EdmResult<Vec<PolicyCode>> {
		let prefix = format!("{}/", user_id);
		let mut res: Vec<PolicyCode> = self
			.scan(TABLE_POLICIES, prefix.clone())
			.await?
			.iter()
			.filter_map(|(key, _)| key.strip_prefix(&prefix)?.parse().ok().map(PolicyCode))
			.collect();
		res.sort_by_key(|code| code.0);
		Ok(res)
	}
}

impl std::fmt::Debug for StoreAdapterRedb {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StoreAdapterRedb").finish_non_exhaustive()
	}
}

// vim: ts=4
