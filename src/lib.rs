pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{GeminiClient, WorkbookSource};
pub use app::{Session, SessionOptions};
pub use crate::core::{catalog::Catalog, engine::BundleEngine, engine::BundleOutcome};
pub use utils::error::{BundleError, Result};
