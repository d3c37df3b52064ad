//! termgraph common library
//!
//! Shared plumbing for the termgraph workspace members.
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Checksums**: content fingerprints for loaded ontology sources
//!
//! # Example
//!
//! ```no_run
//! use termgraph_common::checksum::sha256_hex;
//!
//! let digest = sha256_hex("format-version: 1.2");
//! assert_eq!(digest.len(), 64);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
