//! Configuration management.
//!
//! This module provides configuration loading through TOML files and
//! environment variable overrides via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use bck::config::{ConfigurationLoader, EnvironmentLoader};
//! use bck::model::InMemoryClient;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let mut loader = ConfigurationLoader::new(Some(Path::new("config/bck.toml"))).unwrap();
//! loader.apply_environment(&env);
//!
//! let dispatcher = loader.config.dispatcher(Arc::new(InMemoryClient::new(1))).unwrap();
//! println!("Prefix: {}", loader.config.prefix().unwrap());
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    ConfigurationLoader, FrameworkConfig, LoggingConfig, PrefixConfig, DEFAULT_CONFIG_PATH,
};
pub use self::environment::EnvironmentLoader;
