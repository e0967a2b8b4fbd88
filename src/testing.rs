//! Testing utilities for provider implementations.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the host would,
//! without the [`Host`](crate::host::Host) response wrapping, so tests can
//! use `?` and inspect typed results.
//!
//! # Example
//!
//! ```ignore
//! use minecraft_provider::testing::ProviderTester;
//! use minecraft_provider::MinecraftProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_block() {
//!     let tester = ProviderTester::new(MinecraftProvider::new());
//!     tester
//!         .configure(json!({"endpoint": server.uri(), "api_key": "test"}))
//!         .await
//!         .unwrap();
//!
//!     let state = tester
//!         .lifecycle_create("minecraft_block", json!({
//!             "x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"
//!         }))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["id"], "-1273_24_288");
//! }
//! ```

use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ReadResult};
use serde_json::Value;

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, proposed_state).await
    }

    /// Plan a change to an existing resource.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), proposed_state)
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<ReadResult, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        Ok(self.read(resource_type, created).await?.state)
    }

    /// Apply a configuration change the way the host does: plan, then
    /// delete and re-create when the plan replaces, update when it changes
    /// in place, or keep the prior state.
    ///
    /// Returns the plan (with its diagnostics) and the resulting state.
    pub async fn lifecycle_replace(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<(PlanResult, Value), ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;

        let state = if plan.requires_replace {
            self.delete(resource_type, prior_state).await?;
            self.create(resource_type, plan.planned_state.clone())
                .await?
        } else if plan.has_changes() {
            self.update(resource_type, prior_state, plan.planned_state.clone())
                .await?
        } else {
            plan.planned_state.clone()
        };

        let state = self.read(resource_type, state).await?.state;
        Ok((plan, state))
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result creates the resource.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan destroys the resource.
///
/// # Panics
///
/// Panics if the planned state is not null.
pub fn assert_plan_destroys(plan: &PlanResult) {
    assert!(
        plan.planned_state.is_null(),
        "Expected plan to destroy, but planned state is {}",
        plan.planned_state
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain a warning with the given summary.
///
/// Returns the matching warning so its detail can be checked.
///
/// # Panics
///
/// Panics if no warning has exactly that summary.
pub fn assert_has_warning<'a>(diagnostics: &'a [Diagnostic], summary: &str) -> &'a Diagnostic {
    diagnostics
        .iter()
        .find(|d| d.severity == DiagnosticSeverity::Warning && d.summary == summary)
        .unwrap_or_else(|| {
            panic!(
                "Expected a warning '{}', got: {:?}",
                summary,
                diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{plan_destroy, plan_replace};
    use crate::schema::{Attribute, Schema};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Replace-only, in memory; counts deletes.
    #[derive(Default)]
    struct TestProvider {
        deletes: AtomicUsize,
    }

    fn lamp_schema() -> Schema {
        Schema::v0()
            .with_attribute("color", Attribute::required_string().with_force_new())
            .with_attribute("id", Attribute::computed_string())
    }

    #[async_trait::async_trait]
    impl ProviderService for TestProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new().with_resource("test_lamp", lamp_schema())
        }

        async fn configure(&self, _config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            Ok(vec![])
        }

        async fn plan(
            &self,
            _resource_type: &str,
            prior_state: Option<Value>,
            proposed_state: Value,
        ) -> Result<PlanResult, ProviderError> {
            if proposed_state.is_null() {
                return Ok(plan_destroy(prior_state));
            }
            Ok(plan_replace(&lamp_schema(), prior_state, proposed_state))
        }

        async fn create(
            &self,
            _resource_type: &str,
            mut planned_state: Value,
        ) -> Result<Value, ProviderError> {
            let id = format!("lamp-{}", planned_state["color"].as_str().unwrap_or_default());
            planned_state["id"] = json!(id);
            Ok(planned_state)
        }

        async fn read(
            &self,
            _resource_type: &str,
            current_state: Value,
        ) -> Result<ReadResult, ProviderError> {
            Ok(ReadResult::new(current_state))
        }

        async fn update(
            &self,
            _resource_type: &str,
            _prior_state: Value,
            planned_state: Value,
        ) -> Result<Value, ProviderError> {
            Ok(planned_state)
        }

        async fn delete(
            &self,
            _resource_type: &str,
            _current_state: Value,
        ) -> Result<(), ProviderError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn import_resource(
            &self,
            resource_type: &str,
            id: &str,
        ) -> Result<Vec<ImportedResource>, ProviderError> {
            Ok(vec![ImportedResource::new(resource_type, json!({"id": id}))])
        }

        async fn read_data_source(
            &self,
            data_source_type: &str,
            _config: Value,
        ) -> Result<Value, ProviderError> {
            Err(ProviderError::UnknownResource(data_source_type.to_string()))
        }
    }

    #[tokio::test]
    async fn test_tester_schema_and_types() {
        let tester = ProviderTester::new(TestProvider::default());
        assert!(tester.schema().resources.contains_key("test_lamp"));
        assert_eq!(tester.resource_types(), vec!["test_lamp"]);
        assert!(tester.data_source_types().is_empty());
    }

    #[tokio::test]
    async fn test_tester_validate_resource_config() {
        let tester = ProviderTester::new(TestProvider::default());
        assert!(tester
            .validate_resource_config("test_lamp", json!({"color": "red"}))
            .await
            .is_ok());

        let err = tester
            .validate_resource_config("test_lamp", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::Diagnostics(ref d) if d.len() == 1));
    }

    #[tokio::test]
    async fn test_tester_lifecycle_create() {
        let tester = ProviderTester::new(TestProvider::default());
        let state = tester
            .lifecycle_create("test_lamp", json!({"color": "red"}))
            .await
            .unwrap();
        assert_eq!(state["id"], "lamp-red");
    }

    #[tokio::test]
    async fn test_tester_lifecycle_replace() {
        let tester = ProviderTester::new(TestProvider::default());
        let state = tester
            .lifecycle_create("test_lamp", json!({"color": "red"}))
            .await
            .unwrap();

        let (plan, state) = tester
            .lifecycle_replace("test_lamp", state, json!({"color": "blue"}))
            .await
            .unwrap();

        assert_plan_replaces(&plan);
        assert_plan_changes_attribute(&plan, "color");
        assert_eq!(state["id"], "lamp-blue");
        assert_eq!(tester.provider().deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tester_lifecycle_replace_without_changes_keeps_state() {
        let tester = ProviderTester::new(TestProvider::default());
        let state = tester
            .lifecycle_create("test_lamp", json!({"color": "red"}))
            .await
            .unwrap();

        let (plan, after) = tester
            .lifecycle_replace("test_lamp", state.clone(), json!({"color": "red"}))
            .await
            .unwrap();

        assert_plan_no_changes(&plan);
        assert_eq!(after, state);
        assert_eq!(tester.provider().deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tester_lifecycle_delete() {
        let tester = ProviderTester::new(TestProvider::default());
        let plan = tester
            .plan_delete("test_lamp", json!({"color": "red", "id": "lamp-red"}))
            .await
            .unwrap();
        assert_plan_destroys(&plan);

        tester
            .lifecycle_delete("test_lamp", json!({"color": "red", "id": "lamp-red"}))
            .await
            .unwrap();
        assert_eq!(tester.provider().deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_assert_no_errors() {
        let diagnostics = vec![Diagnostic::warning("Just a warning")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_fails() {
        let diagnostics = vec![Diagnostic::error("An error")];
        assert_no_errors(&diagnostics);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Invalid configuration value")];
        assert_has_errors(&diagnostics);
        assert_error_contains(&diagnostics, "configuration");
    }

    #[test]
    fn test_assert_has_warning() {
        let diagnostics = vec![
            Diagnostic::error("Client Error"),
            Diagnostic::warning("Schema File Changed").with_detail("Old file hash: a"),
        ];
        let warning = assert_has_warning(&diagnostics, "Schema File Changed");
        assert!(warning.detail.as_deref().unwrap().contains("Old file hash"));
    }

    #[test]
    #[should_panic(expected = "Expected a warning")]
    fn test_assert_has_warning_fails() {
        assert_has_warning(&[Diagnostic::error("Schema File Changed")], "Schema File Changed");
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("First error").with_attribute("material"),
            Diagnostic::error("Second error").with_detail("More info"),
        ]);

        let display = format!("{}", err);
        assert!(display.contains("First error"));
        assert!(display.contains("Second error"));
        assert!(display.contains("material"));
        assert!(display.contains("More info"));
    }
}
