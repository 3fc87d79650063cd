//! # solusvm-core
//!
//! Core types and utilities for working with the SolusVM client API.
//!
//! This crate provides the shared error type, HTTP client configuration, validated
//! connection settings and the byte-count formatter used by `solusvm-client`.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and stable error codes
//! - [`client`] - HTTP client configuration and defaults
//! - [`config`] - Validated connection configuration (host, key, hash)
//! - [`units`] - Human-readable byte formatting

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod units;

// Re-export commonly used types
pub use error::{Error, Result};
