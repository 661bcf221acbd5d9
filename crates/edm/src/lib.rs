//! EDM is an enterprise device management policy service.
//!
//! Privileged admin applications read and change device-wide policies through
//! it: restricting app install, uninstall and launch, disabling peripherals,
//! constraining accounts and reading device identifiers.
//!
//! # Features
//!
//! - Admin registry with tiers (normal, enterprise, super) and per-admin permissions
//! - Policy plugins with typed values and additive merge across admins
//! - Retraction of a removed admin's contributions
//! - Pluggable persistence (JSON files or redb)

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from edm-types
pub use edm_types::ability;
pub use edm_types::admin_adapter;
pub use edm_types::error;
pub use edm_types::policy_adapter;
pub use edm_types::request;
pub use edm_types::types;
pub use edm_types::value;
pub use edm_types::worker;

// Feature crate re-exports
pub use edm_core as core;
pub use edm_plugins as plugins;

// Local modules
pub mod app;
pub mod prelude;
pub mod transport;

pub use app::{App, AppBuilder};
pub use transport::ServiceHandle;

// vim: ts=4
