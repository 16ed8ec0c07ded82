//! # casefuse common library
//!
//! Shared code for the casefuse services:
//! - Error and result types
//! - Bootstrap TOML configuration loading and config-file resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
