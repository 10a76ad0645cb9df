//! Records in the marketplace REST API's own shape.
//!
//! Field names follow the API (`snake_case`) and every struct tolerates
//! missing fields, so the same types deserialize live responses and the
//! embedded fixture documents. Adapters turn these into view models.

mod category;
mod item;
mod payment;
mod purchase;
mod question;
mod review;
mod seller;
mod shipping;

pub use category::*;
pub use item::*;
pub use payment::*;
pub use purchase::*;
pub use question::*;
pub use review::*;
pub use seller::*;
pub use shipping::*;

use serde::{Deserialize, Serialize};

/// Offset pagination block used by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_results: Option<u64>,
}

impl Paging {
    #[must_use]
    pub const fn new(total: u64, offset: u32, limit: u32) -> Self {
        Self {
            total,
            offset,
            limit,
            primary_results: None,
        }
    }
}

/// Slice `items` by `offset`/`limit`, clamping to the available range.
pub(crate) fn page<T: Clone>(items: &[T], offset: u32, limit: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

/// Identifiers the API sends as numbers for some resources and strings for others.
pub(crate) mod flexible_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => T::from(text),
            Raw::Number(number) => T::from(number.to_string()),
        })
    }
}
