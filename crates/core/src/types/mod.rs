//! Core types for Vitrina.
//!
//! This module provides type-safe wrappers for common marketplace concepts.

pub mod id;
pub mod price;
pub mod rating;
pub mod site;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use rating::{RatingDistribution, round_to_tenth};
pub use site::{SiteId, SiteIdError};
pub use status::*;
