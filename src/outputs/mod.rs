//! Persistence, reporting and text views.
//!
//! # Submodules
//!
//! - [`archive`]: Loads and rewrites the dated JSON archive
//! - [`report`]: Per-source totals and the end-of-run summary
//! - [`digest`]: Feed and full-article text for the browse commands

pub mod archive;
pub mod digest;
pub mod report;
