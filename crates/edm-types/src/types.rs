//! Common types used throughout the EDM service.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::prelude::*;

// UserId //
//********//
/// Owning user (OS account) of an admin or a policy value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
	/// The primary user every device starts with
	pub const DEFAULT: UserId = UserId(100);
}

impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// PolicyCode //
//************//
/// Unique identifier of one governed configuration item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyCode(pub u32);

impl std::fmt::Display for PolicyCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Admin privilege level. Ordering follows privilege: `Normal < Enterprise < Super`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdminTier {
	#[serde(rename = "normal")]
	Normal,
	#[serde(rename = "enterprise")]
	Enterprise,
	#[serde(rename = "super")]
	Super,
}

impl std::fmt::Display for AdminTier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AdminTier::Normal => write!(f, "normal"),
			AdminTier::Enterprise => write!(f, "enterprise"),
			AdminTier::Super => write!(f, "super"),
		}
	}
}

/// Enterprise metadata attached to an admin (empty for normal admins)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntInfo {
	#[serde(default)]
	pub enterprise_name: Box<str>,
	#[serde(default)]
	pub description: Box<str>,
}

impl EntInfo {
	pub fn new(enterprise_name: impl Into<Box<str>>, description: impl Into<Box<str>>) -> Self {
		Self { enterprise_name: enterprise_name.into(), description: description.into() }
	}
}

/// The calling admin application: package plus entry-point ability
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
	pub package_name: Box<str>,
	pub ability_name: Box<str>,
}

impl AdminIdentity {
	pub fn new(package_name: impl Into<Box<str>>, ability_name: impl Into<Box<str>>) -> Self {
		Self { package_name: package_name.into(), ability_name: ability_name.into() }
	}
}

/// Validates a package name before it is used as a storage key
pub fn validate_package_name(package_name: &str) -> EdmResult<()> {
	if package_name.is_empty()
		|| package_name.starts_with('.')
		|| package_name.contains(['/', '\\', '\0'])
	{
		return Err(Error::ParamError(format!("invalid package name: {:?}", package_name)));
	}
	Ok(())
}

/// Operation requested on a policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuncOperateType {
	#[serde(rename = "set")]
	Set,
	#[serde(rename = "get")]
	Get,
	#[serde(rename = "remove")]
	Remove,
}

impl std::fmt::Display for FuncOperateType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FuncOperateType::Set => write!(f, "SET"),
			FuncOperateType::Get => write!(f, "GET"),
			FuncOperateType::Remove => write!(f, "REMOVE"),
		}
	}
}


// vim: ts=4
