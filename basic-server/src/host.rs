//! Host-backed system abilities for running the service outside a device.
//! Mutating calls are only logged; identity queries answer from the environment.

use std::{collections::HashMap, env, fs, path::PathBuf};

use edm::ability::SystemAbility;
use edm::prelude::*;

#[derive(Debug)]
pub struct LogAbility {
	name: &'static str,
}

impl LogAbility {
	pub fn new(name: &'static str) -> Self {
		Self { name }
	}
}

impl SystemAbility for LogAbility {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		info!(ability = self.name, op, "{:?}", args);
		Ok(None)
	}
}

#[derive(Debug)]
pub struct HostDeviceInfo {
	serial: String,
	device_name: String,
}

impl HostDeviceInfo {
	pub fn from_env() -> Self {
		Self {
			serial: env::var("EDM_DEVICE_SERIAL").unwrap_or_else(|_| "0000000000".into()),
			device_name: env::var("EDM_DEVICE_NAME").unwrap_or_else(|_| "edm-host".into()),
		}
	}
}

impl SystemAbility for HostDeviceInfo {
	fn invoke(&self, op: &str, _args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		let value = match op {
			"get_serial" => self.serial.clone(),
			"get_display_version" => format!("edm-basic-server {}", env!("CARGO_PKG_VERSION")),
			"get_device_name" => self.device_name.clone(),
			_ => return Err(Error::OperationNotSupported),
		};
		Ok(Some(PolicyValue::String(value)))
	}
}

/// Network queries against Linux sysfs. IPv4 addresses come from
/// `EDM_NET_ADDRS` (`eth0=192.168.1.10,wlan0=10.0.0.2`).
#[derive(Debug)]
pub struct HostNetwork {
	sys_net: PathBuf,
	addrs: HashMap<String, String>,
}

impl HostNetwork {
	pub fn new(sys_net: impl Into<PathBuf>, addrs: &str) -> Self {
		let addrs = addrs
			.split(',')
			.filter_map(|pair| pair.split_once('='))
			.map(|(iface, ip)| (iface.trim().to_string(), ip.trim().to_string()))
			.collect();
		Self { sys_net: sys_net.into(), addrs }
	}

	pub fn from_env() -> Self {
		Self::new("/sys/class/net", &env::var("EDM_NET_ADDRS").unwrap_or_default())
	}

	fn interfaces(&self) -> EdmResult<Vec<String>> {
		let mut names = fs::read_dir(&self.sys_net)?
			.filter_map(Result::ok)
			.filter_map(|entry| entry.file_name().into_string().ok())
			.filter(|name| name != "lo")
			.collect::<Vec<_>>();
		names.sort();
		Ok(names)
	}

	fn interface_dir(&self, iface: &str) -> EdmResult<PathBuf> {
		let dir = self.sys_net.join(iface);
		if iface.contains('/') || !dir.is_dir() {
			return Err(Error::SystemAbnormally(format!("no interface {}", iface)));
		}
		Ok(dir)
	}
}

impl SystemAbility for HostNetwork {
	fn invoke(&self, op: &str, args: &[PolicyValue]) -> EdmResult<Option<PolicyValue>> {
		if op == "get_all_interfaces" {
			return Ok(Some(PolicyValue::StringArray(self.interfaces()?)));
		}

		let Some(PolicyValue::String(iface)) = args.first() else {
			return Err(Error::ParamError("interface name expected".into()));
		};
		let dir = self.interface_dir(iface)?;
		let value = match op {
			"get_mac" => fs::read_to_string(dir.join("address"))?.trim().to_string(),
			"get_ip_address" => self.addrs.get(iface.as_str()).cloned().unwrap_or_default(),
			_ => return Err(Error::OperationNotSupported),
		};
		Ok(Some(PolicyValue::String(value)))
	}
}


// vim: ts=4
