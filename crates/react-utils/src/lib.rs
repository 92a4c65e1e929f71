//! Shared utilities for react-agent-rs
//!
//! This crate provides the pieces the binaries share: logging setup and the
//! application configuration loaded from the environment.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError};
pub use logging::{LogFormat, init_tracing};
