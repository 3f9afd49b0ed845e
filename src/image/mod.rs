//! Image fetching and caching.
//!
//! The presentation mapper never touches the filesystem or network itself.
//! It asks an [`ImageFetch`] capability for a decoded image and keeps the
//! result in an [`ImageCache`] keyed by the raw source string.

mod loader;

pub use loader::{ImageCache, ImageLoader};

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

/// A decoded image shared between the cache and presentation nodes.
pub type SharedImage = Arc<DynamicImage>;

/// Capability that turns an image source into a decoded image.
///
/// Returning `None` means the image is unavailable for any reason
/// (missing file, decode failure, timeout). Implemented for plain closures
/// so callers and tests can inject their own source.
pub trait ImageFetch {
    fn fetch(&self, url: &str) -> Option<DynamicImage>;
}

impl<F> ImageFetch for F
where
    F: Fn(&str) -> Option<DynamicImage>,
{
    fn fetch(&self, url: &str) -> Option<DynamicImage> {
        self(url)
    }
}

/// Why an image could not be loaded.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Remote sources belong to an external fetcher.
    #[error("unsupported image source scheme: {0}")]
    UnsupportedScheme(String),
}

/// A fetch capability that never produces an image.
///
/// Used when image loading is disabled; nodes keep their alt text.
pub fn no_images(_url: &str) -> Option<DynamicImage> {
    None
}
