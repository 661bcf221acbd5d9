//! Read-only device identifiers, queried live on every GET.

use async_trait::async_trait;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

#[derive(Debug)]
pub struct DeviceInfoPlugin {
	desc: PolicyDescriptor,
	/// Operation of the device info ability answering the query
	op: &'static str,
}

impl DeviceInfoPlugin {
	fn new(code: PolicyCode, name: &'static str, op: &'static str) -> Self {
		Self {
			desc: PolicyDescriptor {
				code,
				name,
				permission: permissions::GET_DEVICE_INFO,
				min_tier: AdminTier::Enterprise,
				storage: Storage::Live,
				serializer: Serializer::String,
			},
			op,
		}
	}

	pub fn serial() -> Self {
		Self::new(codes::GET_DEVICE_SERIAL, "get_device_serial", "get_serial")
	}

	pub fn display_version() -> Self {
		Self::new(codes::GET_DISPLAY_VERSION, "get_display_version", "get_display_version")
	}

	pub fn device_name() -> Self {
		Self::new(codes::GET_DEVICE_NAME, "get_device_name", "get_device_name")
	}
}

#[async_trait]
impl PolicyPlugin for DeviceInfoPlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_get(
		&self,
		ctx: &PluginCtx<'_>,
		_current: PolicyValue,
		_arg: Option<&str>,
	) -> EdmResult<PolicyValue> {
		match ctx.abilities.invoke(AbilityId::DEVICE_INFO, self.op, Vec::new()).await? {
			Some(value @ PolicyValue::String(_)) => Ok(value),
			other => {
				error!(op = self.op, "Unexpected device info reply: {:?}", other);
				Err(Error::SystemAbnormally(format!("{} returned no string", self.op)))
			}
		}
	}
}


// vim: ts=4
