//! Shared configuration for Cathode.
//!
//! Centralizes the config models and the file/environment layering so the
//! worker binary and any future surfaces share one source of truth for
//! defaults and validation rules.

pub mod loader;
pub mod models;

pub use loader::{ConfigLoadError, load};
pub use models::{
    Config, DatabaseConfig, SourceConfig, SyncSettings, WorkerConfig,
};
