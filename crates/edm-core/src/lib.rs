//! Core of the EDM device policy service.
//!
//! Holds the admin registry, the permission catalog, the policy plugin framework
//! with its registry, the policy store and the dispatch pipeline that ties them
//! together. Concrete policies live in `edm-plugins`, bootstrap in `edm`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod ability_manager;
pub mod admin;
pub mod app;
pub mod conn_manager;
pub mod dispatch;
pub mod lifecycle;
pub mod permission;
pub mod plugin;
pub mod policy_store;
pub mod prelude;
pub mod serializer;

#[cfg(test)]
mod test_util;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState};
pub use plugin::{Change, PluginCtx, PluginRegistry, PolicyDescriptor, PolicyPlugin, Storage};
pub use serializer::Serializer;

// vim: ts=4
