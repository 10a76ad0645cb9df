//! Marketplace regions and their site settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vitrina_core::{CurrencyCode, SiteId};

/// Country the storefront serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Colombia,
    Argentina,
    Mexico,
    Brazil,
    Chile,
}

/// Site, currency and locale settings for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSettings {
    pub site_id: SiteId,
    pub currency: CurrencyCode,
    pub language: &'static str,
    pub timezone: &'static str,
    pub payment_methods: &'static [&'static str],
    pub shipping_methods: &'static [&'static str],
}

impl Region {
    pub const ALL: [Self; 5] = [
        Self::Colombia,
        Self::Argentina,
        Self::Mexico,
        Self::Brazil,
        Self::Chile,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colombia => "colombia",
            Self::Argentina => "argentina",
            Self::Mexico => "mexico",
            Self::Brazil => "brazil",
            Self::Chile => "chile",
        }
    }

    #[must_use]
    pub const fn settings(self) -> RegionSettings {
        match self {
            Self::Colombia => RegionSettings {
                site_id: SiteId::Mco,
                currency: CurrencyCode::Cop,
                language: "es",
                timezone: "America/Bogota",
                payment_methods: &["visa", "mastercard", "pse", "efecty", "mercadopago"],
                shipping_methods: &["standard", "express", "pickup"],
            },
            Self::Argentina => RegionSettings {
                site_id: SiteId::Mla,
                currency: CurrencyCode::Ars,
                language: "es",
                timezone: "America/Argentina/Buenos_Aires",
                payment_methods: &["visa", "mastercard", "rapipago", "pagofacil", "mercadopago"],
                shipping_methods: &["standard", "express", "pickup", "correo_argentino"],
            },
            Self::Mexico => RegionSettings {
                site_id: SiteId::Mlm,
                currency: CurrencyCode::Mxn,
                language: "es",
                timezone: "America/Mexico_City",
                payment_methods: &["visa", "mastercard", "oxxo", "mercadopago"],
                shipping_methods: &["standard", "express", "pickup"],
            },
            Self::Brazil => RegionSettings {
                site_id: SiteId::Mlb,
                currency: CurrencyCode::Brl,
                language: "pt",
                timezone: "America/Sao_Paulo",
                payment_methods: &["visa", "mastercard", "boleto", "pix", "mercadopago"],
                shipping_methods: &["standard", "express", "pickup", "correios"],
            },
            Self::Chile => RegionSettings {
                site_id: SiteId::Mlc,
                currency: CurrencyCode::Clp,
                language: "es",
                timezone: "America/Santiago",
                payment_methods: &["visa", "mastercard", "mercadopago"],
                shipping_methods: &["standard", "express", "pickup"],
            },
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colombia" | "co" => Ok(Self::Colombia),
            "argentina" | "ar" => Ok(Self::Argentina),
            "mexico" | "mx" => Ok(Self::Mexico),
            "brazil" | "br" => Ok(Self::Brazil),
            "chile" | "cl" => Ok(Self::Chile),
            _ => Err(format!("invalid region: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_region_site_and_currency_agree() {
        for region in Region::ALL {
            let settings = region.settings();
            assert_eq!(settings.site_id.currency(), settings.currency);
        }
    }

    #[test]
    fn test_region_parse() {
        assert_eq!("Brazil".parse::<Region>().unwrap(), Region::Brazil);
        assert_eq!(Region::Brazil.settings().language, "pt");
        assert!("peru".parse::<Region>().is_err());
    }
}
