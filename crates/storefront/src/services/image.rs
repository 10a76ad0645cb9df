use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vitrina_core::ItemId;

use super::ServiceResult;
use crate::marketplace::Picture;

/// Rendition sizes served by the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    /// 100x100.
    Small,
    /// 500x500.
    #[default]
    Medium,
    /// Original upload.
    Large,
    /// 50x50.
    Thumbnail,
}

impl ImageSize {
    /// Size code embedded in CDN file names.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Small => "-I.",
            Self::Medium => "-O.",
            Self::Large => "-F.",
            Self::Thumbnail => "-V.",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Thumbnail => "thumbnail",
        })
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "thumbnail" => Ok(Self::Thumbnail),
            _ => Err(format!("invalid image size: {s}")),
        }
    }
}

/// Swap the size code of an `mlstatic.com` URL; other URLs are returned as is.
///
/// The size code is the first `-X.` with `X` an uppercase ASCII letter.
#[must_use]
pub fn optimize_image_url(url: &str, size: ImageSize) -> String {
    if !url.contains("mlstatic.com") {
        return url.to_owned();
    }
    let position = url
        .as_bytes()
        .windows(3)
        .position(|w| matches!(w, [b'-', code, b'.'] if code.is_ascii_uppercase()));
    let Some(at) = position else {
        return url.to_owned();
    };
    match (url.get(..at), url.get(at + 3..)) {
        (Some(head), Some(tail)) => format!("{head}{}{tail}", size.code()),
        _ => url.to_owned(),
    }
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn get_item_pictures(&self, item: &ItemId) -> ServiceResult<Vec<Picture>>;

    fn optimize_image_url(&self, url: &str, size: ImageSize) -> String {
        optimize_image_url(url, size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_replaces_first_size_code() {
        let url = "https://http2.mlstatic.com/D_NQ_NP_123456-MCO-O.webp";
        assert_eq!(
            optimize_image_url(url, ImageSize::Small),
            "https://http2.mlstatic.com/D_NQ_NP_123456-MCO-I.webp"
        );
        assert_eq!(
            optimize_image_url(url, ImageSize::Thumbnail),
            "https://http2.mlstatic.com/D_NQ_NP_123456-MCO-V.webp"
        );
    }

    #[test]
    fn test_optimize_leaves_foreign_urls() {
        let url = "https://cdn.example.com/photo-O.jpg";
        assert_eq!(optimize_image_url(url, ImageSize::Large), url);
        let no_code = "https://http2.mlstatic.com/D_Q_NP_123456-MCO12345678.jpg";
        assert_eq!(optimize_image_url(no_code, ImageSize::Small), no_code);
    }

    #[test]
    fn test_size_parse() {
        assert_eq!("LARGE".parse::<ImageSize>().unwrap(), ImageSize::Large);
        assert!("huge".parse::<ImageSize>().is_err());
    }
}
