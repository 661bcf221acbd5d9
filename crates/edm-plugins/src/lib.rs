//! Device policy plugins.
//!
//! Every policy the service governs is implemented here and registered by
//! `register_plugins` during bootstrap. Registration order does not matter,
//! policy codes are unique keys.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod bundle_rules;
pub mod device_info;
pub mod network;
pub mod prelude;
pub mod printer;
pub mod reset_factory;

#[cfg(test)]
mod test_util;

use std::sync::Arc;

use edm_core::PluginRegistry;

use crate::prelude::*;

/// Policy codes
pub mod codes {
	use edm_types::types::PolicyCode;

	pub const GET_DEVICE_SERIAL: PolicyCode = PolicyCode(1002);
	pub const GET_DISPLAY_VERSION: PolicyCode = PolicyCode(1003);
	pub const GET_DEVICE_NAME: PolicyCode = PolicyCode(1004);
	pub const RESET_FACTORY: PolicyCode = PolicyCode(1005);
	pub const DISALLOW_ADD_LOCAL_ACCOUNT: PolicyCode = PolicyCode(1006);
	pub const GET_ALL_NETWORK_INTERFACES: PolicyCode = PolicyCode(1008);
	pub const GET_IP_ADDRESS: PolicyCode = PolicyCode(1009);
	pub const GET_MAC: PolicyCode = PolicyCode(1010);
	pub const DISABLED_PRINTER: PolicyCode = PolicyCode(1014);
	pub const DISALLOW_RUNNING_BUNDLES: PolicyCode = PolicyCode(1016);
	pub const DISALLOWED_INSTALL_BUNDLES: PolicyCode = PolicyCode(1017);
	pub const DISALLOWED_UNINSTALL_BUNDLES: PolicyCode = PolicyCode(1018);
}

/// Permission identifiers required by the plugins
pub mod permissions {
	pub const GET_DEVICE_INFO: &str = "ohos.permission.ENTERPRISE_GET_DEVICE_INFO";
	pub const RESET_DEVICE: &str = "ohos.permission.ENTERPRISE_RESET_DEVICE";
	pub const SET_ACCOUNT_POLICY: &str = "ohos.permission.ENTERPRISE_SET_ACCOUNT_POLICY";
	pub const GET_NETWORK_INFO: &str = "ohos.permission.ENTERPRISE_GET_NETWORK_INFO";
	pub const RESTRICT_POLICY: &str = "ohos.permission.ENTERPRISE_RESTRICT_POLICY";
	pub const MANAGE_APP_RUNNING: &str = "ohos.permission.ENTERPRISE_MANAGE_SET_APP_RUNNING_POLICY";
	pub const SET_BUNDLE_INSTALL_POLICY: &str = "ohos.permission.ENTERPRISE_SET_BUNDLE_INSTALL_POLICY";
}

pub fn register_plugins(registry: &mut PluginRegistry) -> EdmResult<()> {
	registry.register(Arc::new(device_info::DeviceInfoPlugin::serial()))?;
	registry.register(Arc::new(device_info::DeviceInfoPlugin::display_version()))?;
	registry.register(Arc::new(device_info::DeviceInfoPlugin::device_name()))?;
	registry.register(Arc::new(reset_factory::ResetFactoryPlugin::new()))?;
	registry.register(Arc::new(account::DisallowAddLocalAccountPlugin::new()))?;
	registry.register(Arc::new(network::NetworkInfoPlugin::all_interfaces()))?;
	registry.register(Arc::new(network::NetworkInfoPlugin::ip_address()))?;
	registry.register(Arc::new(network::NetworkInfoPlugin::mac()))?;
	registry.register(Arc::new(printer::DisabledPrinterPlugin::new()))?;
	registry.register(Arc::new(bundle_rules::BundleRulePlugin::disallowed_running()))?;
	registry.register(Arc::new(bundle_rules::BundleRulePlugin::disallowed_install()))?;
	registry.register(Arc::new(bundle_rules::BundleRulePlugin::disallowed_uninstall()))?;
	Ok(())
}


// vim: ts=4
