//! Host adapter.
//!
//! [`Host`] wraps a [`ProviderService`] and never fails: every error is
//! logged and folded into the diagnostics of the response, which is what the
//! host shows the user. Warnings produced by successful operations (schema
//! drift, a schema removed out of band) travel the same way.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{AttributeChange, ImportedResource, ProviderMetadata};

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Response carrying only diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsResponse {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Response to a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    /// Planned state, `None` when planning failed.
    pub planned_state: Option<Value>,
    /// Attribute-level changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource is destroyed and re-created.
    pub requires_replace: bool,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanResponse {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Response to create, read, update and data source reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Resulting state, `None` when the operation failed.
    pub state: Option<Value>,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

impl StateResponse {
    fn ok(state: Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Vec::new(),
        }
    }

    fn failed(err: ProviderError) -> Self {
        Self {
            state: None,
            diagnostics: vec![err.to_diagnostic()],
        }
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Response to an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    /// Imported resources.
    pub imported: Vec<ImportedResource>,
    /// Errors and warnings.
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportResponse {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Drives a provider on behalf of the host.
pub struct Host<P: ProviderService> {
    provider: Arc<P>,
}

impl<P: ProviderService> Clone for Host<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ProviderService> Host<P> {
    /// Wrap a provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Names of everything the provider registers.
    #[instrument(skip(self), name = "provider.get_metadata")]
    pub fn get_metadata(&self) -> ProviderMetadata {
        let metadata = self.provider.metadata();
        info!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        metadata
    }

    /// Provider, resource and data source schemas.
    #[instrument(skip(self), name = "provider.get_schema")]
    pub fn get_schema(&self) -> ProviderSchema {
        let schema = self.provider.schema();
        info!(
            resources = schema.resources.len(),
            data_sources = schema.data_sources.len(),
            "GetSchema completed"
        );
        schema
    }

    /// Validate the provider block.
    #[instrument(skip(self, config), name = "provider.validate_provider_config")]
    pub async fn validate_provider_config(&self, config: Value) -> DiagnosticsResponse {
        debug!("ValidateProviderConfig called");
        let result = self.provider.validate_provider_config(config).await;
        diagnostics_response("ValidateProviderConfig", result)
    }

    /// Configure the provider.
    #[instrument(skip(self, config), name = "provider.configure")]
    pub async fn configure(&self, config: Value) -> DiagnosticsResponse {
        debug!("Configure called");
        let result = self.provider.configure(config).await;
        diagnostics_response("Configure", result)
    }

    /// Validate a resource configuration.
    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> DiagnosticsResponse {
        debug!(resource_type = %resource_type, "ValidateResourceConfig called");
        let result = self
            .provider
            .validate_resource_config(resource_type, config)
            .await;
        diagnostics_response("ValidateResourceConfig", result)
    }

    /// Plan a resource change.
    #[instrument(skip(self, prior_state, proposed_state), name = "provider.plan")]
    pub async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> PlanResponse {
        debug!(resource_type = %resource_type, is_create = prior_state.is_none(), "Plan called");

        match self
            .provider
            .plan(resource_type, prior_state, proposed_state)
            .await
        {
            Ok(result) => {
                info!(
                    resource_type = %resource_type,
                    changes = result.changes.len(),
                    requires_replace = result.requires_replace,
                    "Plan completed"
                );
                PlanResponse {
                    planned_state: Some(result.planned_state),
                    changes: result.changes,
                    requires_replace: result.requires_replace,
                    diagnostics: result.diagnostics,
                }
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Plan failed");
                PlanResponse {
                    diagnostics: vec![e.to_diagnostic()],
                    ..Default::default()
                }
            },
        }
    }

    /// Create a resource.
    #[instrument(skip(self, planned_state), name = "provider.create")]
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> StateResponse {
        info!(resource_type = %resource_type, "Create called");
        match self.provider.create(resource_type, planned_state).await {
            Ok(state) => {
                info!(resource_type = %resource_type, "Create completed successfully");
                StateResponse::ok(state)
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Create failed");
                StateResponse::failed(e)
            },
        }
    }

    /// Refresh a resource.
    #[instrument(skip(self, current_state), name = "provider.read")]
    pub async fn read(&self, resource_type: &str, current_state: Value) -> StateResponse {
        debug!(resource_type = %resource_type, "Read called");
        match self.provider.read(resource_type, current_state).await {
            Ok(result) => {
                if result.diagnostics.is_empty() {
                    debug!(resource_type = %resource_type, "Read completed successfully");
                } else {
                    warn!(
                        resource_type = %resource_type,
                        diagnostics = result.diagnostics.len(),
                        "Read completed with diagnostics"
                    );
                }
                StateResponse {
                    state: Some(result.state),
                    diagnostics: result.diagnostics,
                }
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Read failed");
                StateResponse::failed(e)
            },
        }
    }

    /// Persist an in-place update.
    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> StateResponse {
        info!(resource_type = %resource_type, "Update called");
        match self
            .provider
            .update(resource_type, prior_state, planned_state)
            .await
        {
            Ok(state) => {
                info!(resource_type = %resource_type, "Update completed successfully");
                StateResponse::ok(state)
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Update failed");
                StateResponse::failed(e)
            },
        }
    }

    /// Destroy a resource.
    #[instrument(skip(self, current_state), name = "provider.delete")]
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> DiagnosticsResponse {
        info!(resource_type = %resource_type, "Delete called");
        match self.provider.delete(resource_type, current_state).await {
            Ok(()) => {
                info!(resource_type = %resource_type, "Delete completed successfully");
                DiagnosticsResponse::default()
            },
            Err(e) => {
                error!(resource_type = %resource_type, error = %e, "Delete failed");
                DiagnosticsResponse {
                    diagnostics: vec![e.to_diagnostic()],
                }
            },
        }
    }

    /// Import an existing object by id.
    #[instrument(skip(self), name = "provider.import_resource_state")]
    pub async fn import_resource_state(&self, resource_type: &str, id: &str) -> ImportResponse {
        info!(resource_type = %resource_type, id = %id, "ImportResourceState called");
        match self.provider.import_resource(resource_type, id).await {
            Ok(imported) => {
                info!(
                    resource_type = %resource_type,
                    id = %id,
                    imported_count = imported.len(),
                    "ImportResourceState completed"
                );
                ImportResponse {
                    imported,
                    diagnostics: Vec::new(),
                }
            },
            Err(e) => {
                error!(resource_type = %resource_type, id = %id, error = %e, "ImportResourceState failed");
                ImportResponse {
                    imported: Vec::new(),
                    diagnostics: vec![e.to_diagnostic()],
                }
            },
        }
    }

    /// Validate a data source configuration.
    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> DiagnosticsResponse {
        debug!(data_source_type = %data_source_type, "ValidateDataSourceConfig called");
        let result = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await;
        diagnostics_response("ValidateDataSourceConfig", result)
    }

    /// Read a data source.
    #[instrument(skip(self, config), name = "provider.read_data_source")]
    pub async fn read_data_source(&self, data_source_type: &str, config: Value) -> StateResponse {
        debug!(data_source_type = %data_source_type, "ReadDataSource called");
        match self.provider.read_data_source(data_source_type, config).await {
            Ok(state) => {
                info!(data_source_type = %data_source_type, "ReadDataSource completed successfully");
                StateResponse::ok(state)
            },
            Err(e) => {
                error!(data_source_type = %data_source_type, error = %e, "ReadDataSource failed");
                StateResponse::failed(e)
            },
        }
    }
}

fn diagnostics_response(
    operation: &'static str,
    result: Result<Vec<Diagnostic>, ProviderError>,
) -> DiagnosticsResponse {
    match result {
        Ok(diagnostics) => {
            if has_errors(&diagnostics) {
                warn!(
                    operation,
                    diagnostics = diagnostics.len(),
                    "Completed with errors"
                );
            } else {
                info!(operation, "Completed successfully");
            }
            DiagnosticsResponse { diagnostics }
        },
        Err(e) => {
            error!(operation, error = %e, "Failed");
            DiagnosticsResponse {
                diagnostics: vec![e.to_diagnostic()],
            }
        },
    }
}
