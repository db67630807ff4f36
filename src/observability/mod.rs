//! Observability utilities.
//!
//! The dispatch event bus is the primary observability surface; this module
//! adds a markdown audit log that subscribes to it.
//!
//! # Example
//!
//! ```no_run
//! use bck::dispatch::{Dispatcher, Prefix};
//! use bck::model::InMemoryClient;
//! use bck::observability::AuditLogger;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let dispatcher = Dispatcher::new(Arc::new(InMemoryClient::new(1)), Prefix::text("!"));
//! let logger = AuditLogger::new(None, Some("DEBUG"))?;
//! let events = dispatcher.subscribe();
//! tokio::spawn(async move { logger.listen(events).await });
//! # Ok(())
//! # }
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::AuditLogger;
