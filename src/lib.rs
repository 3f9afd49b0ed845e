// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. image::ImageCache)
    clippy::module_name_repetitions
)]

//! # Marklet
//!
//! A minimal markdown dialect parser and presentation mapper.
//!
//! Marklet understands a deliberately small dialect:
//! - Headings (`#` through `######`)
//! - Bold, italic and strikethrough runs
//! - Images on their own line
//! - Pipe tables with a separator row
//! - Everything else as paragraphs
//!
//! ## Architecture
//!
//! Text flows through three stages:
//! - **Parse**: raw text to an immutable [`document::Document`]
//! - **Render**: document to [`render::PresentationNode`]s, resolving images
//!   through an injected [`image::ImageFetch`] and a shared [`image::ImageCache`]
//! - **Output**: nodes laid out by an external consumer (the CLI's text
//!   writer in [`render::text`])
//!
//! ## Modules
//!
//! - [`document`]: Block and inline scanning, document model
//! - [`render`]: Presentation mapping
//! - [`image`]: Image fetching and caching
//! - [`config`]: CLI defaults file
//! - [`perf`]: Timing and render event log

pub mod config;
pub mod document;
pub mod image;
pub mod perf;
pub mod render;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{BlockElement, Document, InlineSpan};
    pub use crate::image::{ImageCache, ImageFetch, ImageLoader};
    pub use crate::render::{PresentationNode, Renderer};
}
