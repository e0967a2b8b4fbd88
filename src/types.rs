//! Plan, read, and import result types exchanged with the host.

use serde::{Deserialize, Serialize};

use crate::schema::Diagnostic;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<serde_json::Value>,
    /// The value after the change (None if deleting).
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: serde_json::Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement (destroy, then create).
    pub requires_replace: bool,
    /// Warnings raised while planning, such as schema file drift.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }

    /// Attach a diagnostic to this plan.
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Whether the plan changes anything at all.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// The result of refreshing a resource.
///
/// Reads never drop a resource from state on their own; when the remote
/// object looks gone they keep the state and attach a warning so the
/// operator can reconcile the drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    /// The refreshed state.
    pub state: serde_json::Value,
    /// Warnings raised while reading.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResult {
    /// A read with no diagnostics.
    pub fn new(state: serde_json::Value) -> Self {
        Self {
            state,
            diagnostics: Vec::new(),
        }
    }

    /// Attach a diagnostic to this read.
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata: the names of everything the provider registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// The provider type name, used as the prefix of every resource name.
    pub type_name: String,
    /// The provider version.
    pub version: String,
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("id", json!("1_2_3"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("1_2_3")));

        let removed = AttributeChange::removed("material", json!("minecraft:stone"));
        assert_eq!(removed.before, Some(json!("minecraft:stone")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("x", json!(1), json!(2));
        assert_eq!(modified.before, Some(json!(1)));
        assert_eq!(modified.after, Some(json!(2)));
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(json!({"id": "1_2_3"}));
        assert!(!no_change.has_changes());
        assert!(!no_change.requires_replace);

        let replace = PlanResult::with_changes(
            json!({"material": "minecraft:dirt"}),
            vec![AttributeChange::modified(
                "material",
                json!("minecraft:stone"),
                json!("minecraft:dirt"),
            )],
            true,
        )
        .with_diagnostic(Diagnostic::warning("heads up"));
        assert!(replace.has_changes());
        assert!(replace.requires_replace);
        assert_eq!(replace.diagnostics.len(), 1);
    }

    #[test]
    fn test_plan_result_skips_empty_diagnostics() {
        let value = serde_json::to_value(PlanResult::no_change(json!({}))).unwrap();
        assert!(value.get("diagnostics").is_none());
    }

    #[test]
    fn test_read_result() {
        let read = ReadResult::new(json!({"id": "abc"}))
            .with_diagnostic(Diagnostic::warning("Schema Not Found"));
        assert_eq!(read.state["id"], "abc");
        assert_eq!(read.diagnostics.len(), 1);
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new("minecraft_schema", json!({"id": "undo-42"}));
        assert_eq!(imported.resource_type, "minecraft_schema");
        assert_eq!(imported.state["id"], "undo-42");
    }
}
