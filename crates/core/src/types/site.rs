//! Marketplace site identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::price::CurrencyCode;

/// Error returned when parsing an unknown site id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown marketplace site: {0}")]
pub struct SiteIdError(pub String);

/// One of the regional marketplace sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiteId {
    /// Colombia.
    #[default]
    Mco,
    /// Argentina.
    Mla,
    /// Mexico.
    Mlm,
    /// Brazil.
    Mlb,
    /// Chile.
    Mlc,
}

impl SiteId {
    /// All supported sites.
    pub const ALL: [Self; 5] = [Self::Mco, Self::Mla, Self::Mlm, Self::Mlb, Self::Mlc];

    /// Site code used in API paths (`/sites/MCO/...`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mco => "MCO",
            Self::Mla => "MLA",
            Self::Mlm => "MLM",
            Self::Mlb => "MLB",
            Self::Mlc => "MLC",
        }
    }

    /// Currency listings on this site are priced in.
    #[must_use]
    pub const fn currency(self) -> CurrencyCode {
        match self {
            Self::Mco => CurrencyCode::Cop,
            Self::Mla => CurrencyCode::Ars,
            Self::Mlm => CurrencyCode::Mxn,
            Self::Mlb => CurrencyCode::Brl,
            Self::Mlc => CurrencyCode::Clp,
        }
    }

    /// ISO 3166 country code.
    #[must_use]
    pub const fn country_code(self) -> &'static str {
        match self {
            Self::Mco => "CO",
            Self::Mla => "AR",
            Self::Mlm => "MX",
            Self::Mlb => "BR",
            Self::Mlc => "CL",
        }
    }

    /// Infer the site from an item id prefix (`MLA987654321` is Argentina).
    #[must_use]
    pub fn from_item_id(item_id: &str) -> Option<Self> {
        item_id.get(..3).and_then(|prefix| prefix.parse().ok())
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SiteId {
    type Err = SiteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MCO" => Ok(Self::Mco),
            "MLA" => Ok(Self::Mla),
            "MLM" => Ok(Self::Mlm),
            "MLB" => Ok(Self::Mlb),
            "MLC" => Ok(Self::Mlc),
            _ => Err(SiteIdError(s.to_owned())),
        }
    }
}
