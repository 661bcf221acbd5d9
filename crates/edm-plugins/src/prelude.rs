pub use edm_core::prelude::*;
pub use edm_core::{Change, PluginCtx, PolicyDescriptor, PolicyPlugin, Serializer, Storage};
pub use edm_types::ability::AbilityId;

// vim: ts=4
