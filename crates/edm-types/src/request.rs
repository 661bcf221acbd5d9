//! Typed request and response data exchanged at the service boundary.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use crate::types::{AdminIdentity, EntInfo, FuncOperateType};

/// One policy operation requested by an admin application
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
	pub code: PolicyCode,
	pub op: FuncOperateType,
	pub admin: AdminIdentity,
	pub user_id: UserId,
	/// Serialized value for SET and REMOVE
	pub payload: Option<String>,
	/// Extra GET argument (e.g. a network interface name)
	pub arg: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdmRequest {
	Policy(PolicyRequest),
	#[serde(rename_all = "camelCase")]
	EnableAdmin {
		admin: AdminIdentity,
		ent_info: EntInfo,
		tier: AdminTier,
		permissions: Vec<String>,
		user_id: UserId,
	},
	#[serde(rename_all = "camelCase")]
	DisableAdmin { admin: AdminIdentity, user_id: UserId },
	#[serde(rename_all = "camelCase")]
	UpdateAdmin { admin: AdminIdentity, permissions: Vec<String>, user_id: UserId },
	#[serde(rename_all = "camelCase")]
	IsAdminEnabled { admin: AdminIdentity, user_id: UserId },
	#[serde(rename_all = "camelCase")]
	GetEnterpriseInfo { admin: AdminIdentity, user_id: UserId },
}

/// Reply to every request. `result` is present only when `status` is `Ok`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmResponse {
	pub status: ErrCode,
	pub result: Option<String>,
}

impl EdmResponse {
	pub fn ok(result: Option<String>) -> Self {
		Self { status: ErrCode::Ok, result }
	}

	pub fn err(status: ErrCode) -> Self {
		Self { status, result: None }
	}

	pub fn is_ok(&self) -> bool {
		self.status.is_ok()
	}
}

impl From<EdmResult<Option<String>>> for EdmResponse {
	fn from(res: EdmResult<Option<String>>) -> Self {
		match res {
			Ok(result) => Self::ok(result),
			Err(err) => Self::err(err.code()),
		}
	}
}


// vim: ts=4
