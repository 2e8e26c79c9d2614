//! MFA Common - Shared types, utilities, and configuration for the MFA pipeline.
//!
//! This crate provides:
//! - Configuration types and YAML loading
//! - Error types and handling utilities
//! - Logging setup and noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    AnalysisConfig, AnalysisParams, DataRequirements, FetchConfig, FetchStrategy, FundPosition,
    LoggingConfig, MfaConfig, OutputPaths, ServerConfig,
};
pub use error::{Error, Result};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{AnalysisConfig, FetchStrategy, MfaConfig};
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::logging::init_logging;
}
