//! Minecraft Provider
//!
//! A declarative infrastructure provider that manages objects in a Minecraft
//! world through its HTTP API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Resources**: `minecraft_block` (one block) and `minecraft_schema`
//!   (a bundle of blocks placed from a local zip file)
//! - **Data source**: `minecraft_block`, which reads the block at given coordinates
//! - **ProviderService trait** and its implementation, [`MinecraftProvider`]
//! - **Host adapter**: [`Host`] turns every result into diagnostics for the user
//! - **HTTP client**: [`MinecraftClient`], authenticated with an API key
//! - **Error types** and **logging** through `tracing`
//!
//! Nothing in the Minecraft API can be changed in place, so every declared
//! attribute of every resource forces a replacement. Schema resources also
//! track the SHA-256 of their bundle file and are replaced when it changes on
//! disk.
//!
//! # Quick Start
//!
//! ```ignore
//! use minecraft_provider::{init_logging, Host, MinecraftProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!
//!     let host = Host::new(MinecraftProvider::new());
//!     // endpoint and api_key may come from MINECRAFT_ENDPOINT / MINECRAFT_APIKEY instead
//!     let configured = host
//!         .configure(json!({"endpoint": "http://localhost:8080", "api_key": "secret"}))
//!         .await;
//!     assert!(!configured.has_errors());
//!
//!     let block = json!({"x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"});
//!     let plan = host.plan("minecraft_block", None, block).await;
//!     let created = host
//!         .create("minecraft_block", plan.planned_state.unwrap())
//!         .await;
//!     println!("{:?}", created.state);
//! }
//! ```
//!
//! # Operations
//!
//! - **GetMetadata / GetSchema**: resource and data source names and schemas
//! - **ValidateProviderConfig / Configure**: resolve endpoint, API key and timeout
//! - **ValidateResourceConfig**: check a configuration against its schema
//! - **Plan**: create, replace, no-op, or destroy; includes the bundle drift check
//! - **Create/Read/Update/Delete**: lifecycle operations (update only persists state)
//! - **ImportResourceState**: adopt an existing block or schema by id
//! - **ValidateDataSourceConfig / ReadDataSource**: block lookups

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_source;
pub mod error;
pub mod hash;
pub mod host;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::MinecraftClient;
pub use config::{ProviderConfig, ProviderConfigInput};
pub use data_source::BlockDataSource;
pub use error::{ClientError, ConfigError, ProviderError};
pub use host::{DiagnosticsResponse, Host, ImportResponse, PlanResponse, StateResponse};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{MinecraftProvider, ProviderService};
pub use resources::{Reconciler, Resource, ResourceKind};
pub use schema::{Diagnostic, ProviderSchema};
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ReadResult};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
