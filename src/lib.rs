//! # LinkedIn Marketing Tools
//!
//! The LinkedIn Marketing and Community Management REST API (Rest.li 2.0)
//! exposed as validated tools for AI agents:
//! - Ad accounts, campaigns and creatives
//! - Audience targeting and size estimates
//! - Campaign and account analytics
//! - Organization posts and page statistics
//!
//! Every remote call goes through [`LinkedInClient`], which classifies
//! failures into [`LinkedInError`] and retries rate-limited calls with
//! exponential backoff, honoring `retry-after`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkedin_marketing_tools::{ApiClients, LinkedInConfig, ToolRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LinkedInConfig::from_env()?;
//!     let clients = Arc::new(ApiClients::from_config(&config)?);
//!     let registry = ToolRegistry::with_default_tools();
//!
//!     let output = registry
//!         .call("get_campaigns", json!({"account_id": "123456"}), clients)
//!         .await?;
//!     println!("{}", output);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Rest.li wire protocol
pub mod transport;

// Protocol adapter
pub mod client;

// Resilience patterns
pub mod resilience;

// Agent-facing tools and their host
pub mod server;
pub mod tools;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use client::{ApiClients, CreatedEntity, LinkedInClient};
pub use config::{ConfigError, LinkedInConfig, LinkedInConfigBuilder};
pub use errors::{classify, LinkedInError, LinkedInResult, RawFailure, ResponseFailure};
pub use resilience::{RetryConfig, RetryExecutor};
pub use server::ToolServer;
pub use tools::{Tool, ToolRegistry};
pub use transport::{HttpRestliTransport, RestliTransport};
