//! Core module - shared infrastructure for Scribe
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Result, ScribeError};
pub use types::*;
