//! Ortomat - backup and restore for a vending-machine management store
//!
//! This library exports the whole data store to a versioned JSON snapshot
//! and restores a store from one, replacing every entity kind inside a
//! single all-or-nothing transaction.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Entity kinds, their relationships, and operator roles
//! - `storage`: JSON file storage layer with integrity checks
//! - `crypto`: Password hashing for restored accounts
//! - `backup`: Snapshot format, exporter, and restorer
//! - `services`: Admin-guarded, audited backup operations
//! - `audit`: Audit journal of backup operations
//! - `cli`: Command handlers for the `ortomat` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use ortomat::config::{paths::OrtomatPaths, settings::Settings};
//! use ortomat::storage::Store;
//!
//! let paths = OrtomatPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = Store::open(paths)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{OrtomatError, OrtomatResult};
