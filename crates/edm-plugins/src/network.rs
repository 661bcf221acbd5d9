//! Network interface queries. IP and MAC lookups take the interface name as
//! the GET argument.

use async_trait::async_trait;

use crate::codes;
use crate::permissions;
use crate::prelude::*;

#[derive(Debug)]
pub struct NetworkInfoPlugin {
	desc: PolicyDescriptor,
	op: &'static str,
	needs_interface: bool,
}

impl NetworkInfoPlugin {
	fn new(
		code: PolicyCode,
		name: &'static str,
		serializer: Serializer,
		op: &'static str,
		needs_interface: bool,
	) -> Self {
		Self {
			desc: PolicyDescriptor {
				code,
				name,
				permission: permissions::GET_NETWORK_INFO,
				min_tier: AdminTier::Enterprise,
				storage: Storage::Live,
				serializer,
			},
			op,
			needs_interface,
		}
	}

	pub fn all_interfaces() -> Self {
		Self::new(
			codes::GET_ALL_NETWORK_INTERFACES,
			"get_all_network_interfaces",
			Serializer::StringArray,
			"get_all_interfaces",
			false,
		)
	}

	pub fn ip_address() -> Self {
		Self::new(codes::GET_IP_ADDRESS, "get_ip_address", Serializer::String, "get_ip_address", true)
	}

	pub fn mac() -> Self {
		Self::new(codes::GET_MAC, "get_mac", Serializer::String, "get_mac", true)
	}
}

#[async_trait]
impl PolicyPlugin for NetworkInfoPlugin {
	fn descriptor(&self) -> &PolicyDescriptor {
		&self.desc
	}

	async fn on_get(
		&self,
		ctx: &PluginCtx<'_>,
		_current: PolicyValue,
		arg: Option<&str>,
	) -> EdmResult<PolicyValue> {
		let mut args = Vec::new();
		if self.needs_interface {
			match arg {
				Some(iface) if !iface.is_empty() => args.push(PolicyValue::String(iface.to_string())),
				_ => return Err(Error::ParamError("network interface name required".into())),
			}
		}

		let reply = ctx.abilities.invoke(AbilityId::NET_MGR, self.op, args).await?;
		match reply {
			Some(value) if value.matches_type(&self.desc.serializer.default_value()) => Ok(value),
			other => {
				error!(op = self.op, "Unexpected network reply: {:?}", other);
				Err(Error::SystemAbnormally(format!("{} returned no {}", self.op, self.desc.name)))
			}
		}
	}
}


// vim: ts=4
