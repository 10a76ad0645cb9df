//! Newtype IDs for type-safe entity references.
//!
//! Marketplace identifiers come in two shapes: opaque strings (`MCO123456789`,
//! `rev_001`, `cart_123`) and numeric user-style ids (`123456`). The
//! `define_id!` and `define_numeric_id!` macros create wrappers for each shape
//! that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Default`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use vitrina_core::define_id;
/// define_id!(ListingId);
/// define_id!(BundleId);
///
/// let listing = ListingId::new("MCO1");
/// let bundle = BundleId::new("MCO1");
///
/// // These are different types, so this won't compile:
/// // let _: ListingId = bundle;
/// assert_eq!(listing.as_str(), bundle.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `u64` with the same derives as
/// [`define_id!`] plus `Copy`, and `new()`/`as_u64()` accessors.
#[macro_export]
macro_rules! define_numeric_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Listing-side identifiers
define_id!(ItemId);
define_id!(VariationId);
define_id!(CategoryId);
define_id!(PictureId);
define_id!(ReviewId);
define_id!(PaymentMethodId);
define_id!(ShippingServiceId);

// Purchase-side identifiers
define_id!(CartId);
define_id!(OrderId);
define_id!(ShipmentId);

// Marketplace users (sellers are users too)
define_numeric_id!(UserId);
define_numeric_id!(SellerId);
define_numeric_id!(QuestionId);

impl From<SellerId> for UserId {
    fn from(id: SellerId) -> Self {
        Self::new(id.as_u64())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_serializes_transparently() {
        let id = ItemId::new("MCO123456789");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"MCO123456789\"");
        let back: ItemId = serde_json::from_str("\"MCO123456789\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_numeric_id_parses_from_path_segment() {
        let id: SellerId = "123456".parse().unwrap();
        assert_eq!(id.as_u64(), 123_456);
        assert_eq!(id.to_string(), "123456");
        assert!("TECHSTORE".parse::<SellerId>().is_err());
    }

    #[test]
    fn test_seller_id_converts_to_user_id() {
        let user: UserId = SellerId::new(987_654).into();
        assert_eq!(user, UserId::new(987_654));
    }
}
