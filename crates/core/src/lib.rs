//! Core library for webtools
//!
//! This crate implements the **Functional Core** of the webtools application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`webtools_core`** (this crate): Pure transformation functions
//! - **`webtools`**: I/O, image decoding, registry requests, CLI and MCP server
//!
//! Every tool is a leaf: input → transform → output. Nothing here performs
//! network I/O or writes to the terminal. The one exception to "no I/O" is the
//! dependency version cache in [`deps`], which reads and writes a single JSON
//! file in a directory chosen by the caller.
//!
//! # Module Organization
//!
//! - [`ico`]: Windows ICO container packing and directory parsing
//! - [`units`]: Length, mass, time, data size and temperature conversion
//! - [`jwt`]: JWT decoding, HMAC verification and signing
//! - [`hash`]: Hash algorithm identification and digests
//! - [`uuids`]: UUID inspection and generation
//! - [`deps`]: package.json dependency freshness and the version cache
//! - [`tools`]: Tool manifest
//!
//! # Example Usage
//!
//! ```rust
//! use webtools_core::ico::{pack_ico, read_directory, IcoImage};
//!
//! let icon = pack_ico(&[
//!     IcoImage::new(16, vec![0; 10]),
//!     IcoImage::new(32, vec![0; 20]),
//! ])
//! .unwrap();
//!
//! let entries = read_directory(&icon).unwrap();
//! assert_eq!(entries[1].offset, 6 + 16 * 2 + 10);
//! ```

pub mod deps;
pub mod hash;
pub mod ico;
pub mod jwt;
pub mod tools;
pub mod units;
pub mod uuids;
