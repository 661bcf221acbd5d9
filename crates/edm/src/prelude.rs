pub use edm_core::prelude::*;

// vim: ts=4
