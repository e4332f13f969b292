//! # Rolodex Common Library
//!
//! Shared code for the rolodex crates:
//! - Error type used across crates
//! - TOML configuration model and resolution
//! - Canonical output column names

pub mod columns;
pub mod config;
pub mod error;

pub use error::{Error, Result};
