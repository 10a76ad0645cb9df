//! Type-safe price representation using decimal arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (pesos, reais), not cents.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(rename = "currency")]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.currency_code.symbol(),
            self.amount.round_dp(2).normalize()
        )
    }
}

/// ISO 4217 currency codes for the supported marketplace sites.
///
/// Colombian pesos are the default: the marketplace's home region is Colombia
/// and listings without a currency are priced in COP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Cop,
    Ars,
    Mxn,
    Brl,
    Clp,
    Usd,
}

impl CurrencyCode {
    /// ISO code as it appears in API payloads.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cop => "COP",
            Self::Ars => "ARS",
            Self::Mxn => "MXN",
            Self::Brl => "BRL",
            Self::Clp => "CLP",
            Self::Usd => "USD",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Brl => "R$",
            Self::Usd => "US$",
            Self::Cop | Self::Ars | Self::Mxn | Self::Clp => "$",
        }
    }

    /// Parse an optional API currency id, falling back to the default.
    #[must_use]
    pub fn parse_or_default(code: Option<&str>) -> Self {
        code.and_then(|c| c.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COP" => Ok(Self::Cop),
            "ARS" => Ok(Self::Ars),
            "MXN" => Ok(Self::Mxn),
            "BRL" => Ok(Self::Brl),
            "CLP" => Ok(Self::Clp),
            "USD" => Ok(Self::Usd),
            _ => Err(format!("invalid currency code: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_times_quantity() {
        let unit = Price::new(Decimal::from(4_899_000), CurrencyCode::Cop);
        assert_eq!(unit.times(3).amount, Decimal::from(14_697_000));
        assert_eq!(unit.times(3).currency_code, CurrencyCode::Cop);
    }

    #[test]
    fn test_currency_fallback() {
        assert_eq!(CurrencyCode::parse_or_default(Some("ars")), CurrencyCode::Ars);
        assert_eq!(CurrencyCode::parse_or_default(Some("XYZ")), CurrencyCode::Cop);
        assert_eq!(CurrencyCode::parse_or_default(None), CurrencyCode::Cop);
    }

    #[test]
    fn test_price_serializes_with_currency_field() {
        let price = Price::new(Decimal::from(350_000), CurrencyCode::Ars);
        let json = serde_json::to_value(price).unwrap();
        assert_eq!(json["currency"], "ARS");
        assert_eq!(json["amount"], "350000");
    }
}
