//! Vitrina Core - Shared types library.
//!
//! This crate provides common types used across all Vitrina components:
//! - `storefront` - Product-detail aggregation service and JSON API
//! - `cli` - Developer tools for environment files and configuration checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure calculations - no I/O, no HTTP
//! clients, no fixture state. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, marketplace sites, statuses and rating math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
