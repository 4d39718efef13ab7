//! Network-facing scrapers: feeds and article pages.
//!
//! Each operation follows the same two-level pattern:
//!
//! 1. A private `try_*` function does the work and returns
//!    `Result<_, BoxError>`, using `?` freely.
//! 2. The public wrapper logs any failure and returns `Option`, so no error
//!    ever crosses a feed or article boundary.
//!
//! # Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`http`] | Client construction and charset-aware body decoding |
//! | [`feed`] | RSS fetch and parse into [`FeedEntry`](crate::models::FeedEntry) |
//! | [`article`] | Noise removal, selector cascade and text extraction |

pub mod article;
pub mod feed;
pub mod http;
