//! Shared types, adapter traits, and core utilities for the EDM device policy service.
//!
//! This crate holds everything the storage adapters, the policy plugins and the
//! service core need to agree on: identifiers, the error taxonomy, persisted record
//! shapes, the adapter traits and the contract for external system abilities.

#![forbid(unsafe_code)]

pub mod ability;
pub mod admin_adapter;
pub mod error;
pub mod policy_adapter;
pub mod prelude;
pub mod request;
pub mod types;
pub mod value;
pub mod worker;

// vim: ts=4
