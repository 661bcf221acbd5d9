//! Filesystem store adapter
//!
//! Keeps one JSON document per record:
//! - `{base}/admins/{user_id}/{package_name}.json`
//! - `{base}/policies/{user_id}/{code}.json`
//!
//! Writes go to a temporary file in the target directory which is synced and
//! then renamed over the record, so a crash never leaves a torn record behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{create_dir_all, read_dir, remove_file, rename, File};
use tokio::io::AsyncWriteExt;

use edm_types::admin_adapter::{AdminAdapter, AdminRecord};
use edm_types::policy_adapter::{PolicyAdapter, PolicyRecord};
use edm_types::prelude::{EdmResult, PolicyCode, UserId};
use tracing::{debug, info, warn};

mod error;
pub use error::Error;

const ADMINS_DIR: &str = "admins";
const POLICIES_DIR: &str = "policies";
const EXT: &str = "json";

fn admin_file_path(base_dir: &Path, user_id: UserId, package_name: &str) -> Result<PathBuf, Error> {
	if package_name.is_empty() || package_name.starts_with('.') || package_name.contains(['/', '\\', '\0']) {
		return Err(Error::InvalidPath(package_name.to_string()));
	}
	Ok(base_dir.join(ADMINS_DIR).join(user_id.to_string()).join(format!("{}.{}", package_name, EXT)))
}

fn policy_file_path(base_dir: &Path, user_id: UserId, code: PolicyCode) -> PathBuf {
	base_dir.join(POLICIES_DIR).join(user_id.to_string()).join(format!("{}.{}", code, EXT))
}

/// Writes `data` to `path` through a synced temporary file
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), Error> {
	let dir = path.parent().ok_or_else(|| Error::InvalidPath(path.display().to_string()))?;
	create_dir_all(dir).await?;

	let tmp_path = dir.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
	let res = async {
		let mut file = File::create(&tmp_path).await?;
		file.write_all(data).await?;
		file.sync_all().await?;
		rename(&tmp_path, path).await?;
		Ok::<(), Error>(())
	}
	.await;
	if res.is_err() {
		warn!("write failed, removing tmpfile: {:?}", &tmp_path);
		let _ignore = remove_file(&tmp_path).await;
	}
	res
}

async fn remove_if_exists(path: &Path) -> Result<(), Error> {
	match remove_file(path).await {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
		Err(err) => Err(err.into()),
	}
}

/// Lists the record files of a directory, skipping temporary files
async fn list_records(dir: &Path) -> Result<Vec<PathBuf>, Error> {
	let mut entries = match read_dir(dir).await {
		Ok(entries) => entries,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err.into()),
	};

	let mut res = Vec::new();
	while let Some(entry) = entries.next_entry().await? {
		let path = entry.path();
		let is_record = path.extension().is_some_and(|ext| ext == EXT)
			&& !path.file_name().is_some_and(|name| name.to_string_lossy().starts_with('.'));
		if is_record && entry.file_type().await?.is_file() {
			res.push(path);
		}
	}
	res.sort();
	Ok(res)
}

#[derive(Debug)]
pub struct StoreAdapterFs {
	base_dir: Box<Path>,
}

impl StoreAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> Result<Self, Error> {
		create_dir_all(base_dir.join(ADMINS_DIR)).await?;
		create_dir_all(base_dir.join(POLICIES_DIR)).await?;
		info!("fs store at {:?}", &base_dir);
		Ok(Self { base_dir })
	}
}

#[async_trait]
impl AdminAdapter for StoreAdapterFs {
	async fn list_admins(&self) -> EdmResult<Vec<AdminRecord>> {
		let mut users = read_dir(self.base_dir.join(ADMINS_DIR)).await?;
		let mut res = Vec::new();
		while let Some(user_dir) = users.next_entry().await? {
			if !user_dir.file_type().await?.is_dir() {
				continue;
			}
			for path in list_records(&user_dir.path()).await? {
				let data = tokio::fs::read(&path).await?;
				match serde_json::from_slice::<AdminRecord>(&data) {
					Ok(admin) => res.push(admin),
					Err(err) => {
						warn!("skipping unreadable admin record {:?}: {}", &path, err);
					}
				}
			}
		}
		debug!("loaded {} admin records", res.len());
		Ok(res)
	}

	async fn write_admin(&self, admin: &AdminRecord) -> EdmResult<()> {
		let path = admin_file_path(&self.base_dir, admin.user_id, &admin.package_name)?;
		let data = serde_json::to_vec(admin).map_err(Error::from)?;
		write_atomic(&path, &data).await?;
		Ok(())
	}

	async fn delete_admin(&self, package_name: &str, user_id: UserId) -> EdmResult<()> {
		remove_if_exists(&admin_file_path(&self.base_dir, user_id, package_name)?).await?;
		Ok(())
	}
}

#[async_trait]
impl PolicyAdapter for StoreAdapterFs {
	async fn read_policy(&self, user_id: UserId, code: PolicyCode) -> EdmResult<Option<PolicyRecord>> {
		let path = policy_file_path(&self.base_dir, user_id, code);
		let data = match tokio::fs::read(&path).await {
			Ok(data) => data,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};
		let record = serde_json::from_slice(&data).map_err(Error::from)?;
		Ok(Some(record))
	}

	async fn write_policy(
		&self,
		user_id: UserId,
		code: PolicyCode,
		record: Option<&PolicyRecord>,
	) -> EdmResult<()> {
		let path = policy_file_path(&self.base_dir, user_id, code);
		match record {
			Some(record) => {
				let data = serde_json::to_vec(record).map_err(Error::from)?;
				write_atomic(&path, &data).await?;
			}
			None => remove_if_exists(&path).await?,
		}
		Ok(())
	}

	async fn list_policies(&self, user_id: UserId) -> EdmResult<Vec<PolicyCode>> {
		let dir = self.base_dir.join(POLICIES_DIR).join(user_id.to_string());
		let mut res: Vec<PolicyCode> = list_records(&dir)
			.await?
			.iter()
			.filter_map(|path| path.file_stem()?.to_str()?.parse().ok().map(PolicyCode))
			.collect();
		res.sort_by_key(|code| code.0);
		Ok(res)
	}
}


// vim: ts=4
