//! Scraping stages, leaf-first.
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Manifest matching | [`manifest`] | raw article markup | `Option<String>` |
//! | Metadata | [`metadata`] | parsed article markup | [`Metadata`](crate::models::Metadata) |
//! | Article fetching | [`articles`] | [`LinkSet`](crate::models::LinkSet) | `Vec<VideoRecord>` |
//! | Scroll loading | [`scroll`] | category URL | rendered markup |
//! | Link discovery | [`links`] | rendered markup | [`LinkSet`](crate::models::LinkSet) |
//!
//! The browser and HTTP client sit behind the [`scroll::BrowserLauncher`],
//! [`scroll::RenderedPage`] and [`articles::PageFetcher`] traits;
//! [`browser`] and [`articles::HttpFetcher`] are the real implementations.

pub mod articles;
pub mod browser;
pub mod links;
pub mod manifest;
pub mod metadata;
pub mod scroll;

#[cfg(test)]
pub mod testing;
