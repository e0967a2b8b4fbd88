//! The provider entry point.
//!
//! [`ProviderService`] is the host-facing contract: JSON in, typed results
//! out. [`MinecraftProvider`] implements it by resolving the provider
//! configuration once, building a shared [`MinecraftClient`], and routing
//! every resource and data source call to the matching reconciler.
//!
//! # Example
//!
//! ```ignore
//! use minecraft_provider::{MinecraftProvider, ProviderService};
//! use serde_json::json;
//!
//! let provider = MinecraftProvider::new();
//! provider
//!     .configure(json!({"endpoint": "http://localhost:8080", "api_key": "secret"}))
//!     .await?;
//!
//! let plan = provider
//!     .plan("minecraft_block", None, json!({"x": 1, "y": 2, "z": 3, "material": "minecraft:stone"}))
//!     .await?;
//! let state = provider.create("minecraft_block", plan.planned_state).await?;
//! ```

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::MinecraftClient;
use crate::config::{ProviderConfig, ProviderConfigInput};
use crate::data_source::{BlockDataSource, BLOCK_DATA_SOURCE};
use crate::error::{ConfigError, ProviderError};
use crate::resources::{Reconciler, ResourceKind};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata, ReadResult};
use crate::validation;

/// Type name of the provider; every resource name starts with it.
pub const PROVIDER_TYPE_NAME: &str = "minecraft";

/// Operations the host drives a provider through.
///
/// Resource and data source schemas come from [`ProviderService::schema`],
/// so the default validation hooks need no per-provider code.
#[async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Names of everything the provider registers, sorted.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.into_keys().collect();
        let mut data_sources: Vec<String> = schema.data_sources.into_keys().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            ..Default::default()
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&self.schema().provider, &config))
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.schema();
        let resource = schema
            .resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        Ok(validation::validate(resource, &config))
    }

    /// Plan changes for a resource. A `null` proposed state plans a destroy.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(&self, resource_type: &str, planned_state: Value)
        -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(&self, resource_type: &str, current_state: Value)
        -> Result<ReadResult, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError>;

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.schema();
        let data_source = schema
            .data_sources
            .get(data_source_type)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))?;
        Ok(validation::validate(data_source, &config))
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}

/// Everything built by `configure`.
#[derive(Debug)]
struct Registry {
    config: ProviderConfig,
    reconcilers: Vec<Reconciler>,
    block_data: BlockDataSource,
}

impl Registry {
    fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Arc::new(MinecraftClient::new(&config)?);
        let reconcilers = ResourceKind::ALL
            .into_iter()
            .map(|kind| Reconciler::new(kind, Arc::clone(&client)))
            .collect();
        Ok(Self {
            config,
            reconcilers,
            block_data: BlockDataSource::new(client),
        })
    }
}

/// The Minecraft provider.
#[derive(Debug)]
pub struct MinecraftProvider {
    version: String,
    registry: OnceLock<Registry>,
}

impl MinecraftProvider {
    /// A provider reporting this crate's version.
    pub fn new() -> Self {
        Self::with_version(env!("CARGO_PKG_VERSION"))
    }

    /// A provider reporting `version`.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            registry: OnceLock::new(),
        }
    }

    /// The reported provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Configure from an already resolved configuration.
    ///
    /// Fails with [`ConfigError::AlreadyConfigured`] on any call after the first
    /// successful one.
    pub fn configure_with(&self, config: ProviderConfig) -> Result<(), ProviderError> {
        if self.registry.get().is_some() {
            return Err(ConfigError::AlreadyConfigured.into());
        }
        let registry = Registry::new(config)?;
        self.registry
            .set(registry)
            .map_err(|_| ConfigError::AlreadyConfigured.into())
    }

    /// Whether `configure` has succeeded.
    pub fn is_configured(&self) -> bool {
        self.registry.get().is_some()
    }

    /// The resolved configuration, once configured.
    pub fn config(&self) -> Option<&ProviderConfig> {
        self.registry.get().map(|r| &r.config)
    }

    fn registry(&self) -> Result<&Registry, ProviderError> {
        self.registry.get().ok_or(ProviderError::NotConfigured)
    }

    fn reconciler(&self, resource_type: &str) -> Result<&Reconciler, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        self.registry()?
            .reconcilers
            .iter()
            .find(|r| r.kind() == kind)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }
}

impl Default for MinecraftProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderService for MinecraftProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        ResourceKind::ALL
            .into_iter()
            .fold(schema, |schema, kind| {
                schema.with_resource(kind.type_name(), kind.schema())
            })
            .with_data_source(BLOCK_DATA_SOURCE, BlockDataSource::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
            resources: ResourceKind::ALL
                .into_iter()
                .map(|kind| kind.type_name().to_string())
                .collect(),
            data_sources: vec![BLOCK_DATA_SOURCE.to_string()],
        }
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let input = ProviderConfigInput::from_value(config)?;
        let resolved = ProviderConfig::resolve(&input)?;
        debug!(endpoint = %resolved.endpoint(), timeout = ?resolved.timeout(), "Resolved provider configuration");
        self.configure_with(resolved)?;
        Ok(vec![])
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.reconciler(resource_type)?
            .plan(prior_state, proposed_state)
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.reconciler(resource_type)?.create(planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ReadResult, ProviderError> {
        self.reconciler(resource_type)?.read(current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.reconciler(resource_type)?
            .update(prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.reconciler(resource_type)?.delete(current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let imported = self.reconciler(resource_type)?.import(id).await?;
        Ok(vec![imported])
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        if data_source_type != BLOCK_DATA_SOURCE {
            return Err(ProviderError::UnknownResource(data_source_type.to_string()));
        }
        self.registry()?.block_data.read(config).await
    }
}
