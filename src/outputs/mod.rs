//! Output generation.
//!
//! A run produces exactly one artifact: the JSON file read by the web page.
//!
//! ```text
//! public/
//! └── data.json   # { "<source id>": [Article, ...], ... }
//! ```
//!
//! The file is replaced in full on every run; nothing is merged with the
//! previous contents.

pub mod json;
