//! Configuration module for Ortomat
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence (backup limits, hashing cost, log filter)

pub mod paths;
pub mod settings;

pub use paths::OrtomatPaths;
pub use settings::{BackupSettings, HashingParams, Settings};
