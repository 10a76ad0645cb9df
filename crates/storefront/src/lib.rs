//! Vitrina storefront library.
//!
//! Product-detail aggregation for a marketplace listing: services with a live
//! and a fixture backend, adapters that normalize their records, use cases
//! that derive page-ready summaries, and the JSON API that serves them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapters;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod fixtures;
pub mod marketplace;
pub mod routes;
pub mod services;
pub mod state;
pub mod usecases;
