//! The `minecraft_schema` resource: a bundle of blocks placed from a local file.
//!
//! Besides the replace-only attributes, the resource tracks the content hash
//! of the bundle file. Editing the file in place, without touching the
//! configuration, still triggers a replacement on the next plan.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{plan_replace, Resource, ResourceKind};
use crate::client::{MinecraftClient, SchemaRequest};
use crate::error::ProviderError;
use crate::hash::hash_file;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Summary of the warning raised when a bundle file changed on disk.
pub const SCHEMA_FILE_CHANGED: &str = "Schema File Changed";

/// Summary of the warning raised when a placed schema is gone remotely.
const SCHEMA_NOT_FOUND: &str = "Schema Not Found";

/// Persisted state of a placed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaState {
    /// X coordinate of the origin.
    #[serde(deserialize_with = "super::whole_number")]
    pub x: i64,
    /// Y coordinate of the origin.
    #[serde(deserialize_with = "super::whole_number")]
    pub y: i64,
    /// Z coordinate of the origin.
    #[serde(deserialize_with = "super::whole_number")]
    pub z: i64,
    /// Rotation in degrees, 0 when unset.
    #[serde(default, deserialize_with = "super::optional_whole_number")]
    pub rotation: Option<i64>,
    /// Path to the bundle file.
    pub schema: String,
    /// Base64 SHA-256 of the bundle at creation time.
    #[serde(default)]
    pub schema_hash: Option<String>,
    /// Undo id issued by the server.
    #[serde(default)]
    pub id: Option<String>,
}

pub(super) fn resource_schema() -> Schema {
    Schema::v0()
        .with_description("A schema bundle placed in the Minecraft world")
        .with_attribute(
            "x",
            Attribute::required_int64()
                .with_description("X coordinate of the schema origin")
                .with_force_new(),
        )
        .with_attribute(
            "y",
            Attribute::required_int64()
                .with_description("Y coordinate of the schema origin")
                .with_force_new(),
        )
        .with_attribute(
            "z",
            Attribute::required_int64()
                .with_description("Z coordinate of the schema origin")
                .with_force_new(),
        )
        .with_attribute(
            "rotation",
            Attribute::optional_int64()
                .with_description("Rotation of the schema in degrees")
                .with_force_new(),
        )
        .with_attribute(
            "schema",
            Attribute::required_string()
                .with_description("Path to the schema bundle (zip) to place")
                .with_force_new(),
        )
        .with_attribute(
            "schema_hash",
            Attribute::computed_string()
                .with_description("Base64 SHA-256 of the schema bundle")
                .with_force_new(),
        )
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Undo id issued by the server"),
        )
}

/// Reconciler for `minecraft_schema`.
#[derive(Debug, Clone)]
pub struct SchemaResource {
    client: Arc<MinecraftClient>,
}

impl SchemaResource {
    /// Create the reconciler around a shared client.
    pub fn new(client: Arc<MinecraftClient>) -> Self {
        Self { client }
    }
}

/// Compare the bundle's current hash to the one stored in `prior`.
///
/// Skipped when `prior` has no stored hash (the resource was never created).
/// On a mismatch the plan is forced into replacement, `schema_hash` carries
/// the new value, and a warning names both hashes.
fn check_drift(
    mut plan: PlanResult,
    prior: &Value,
    proposed_path: &str,
) -> Result<PlanResult, ProviderError> {
    let Some(old_hash) = prior.get("schema_hash").and_then(Value::as_str) else {
        return Ok(plan);
    };

    let new_hash = hash_file(proposed_path)?;
    if new_hash == old_hash {
        return Ok(plan);
    }

    warn!(
        schema = %proposed_path,
        old_hash = %old_hash,
        new_hash = %new_hash,
        "Schema file changed since creation"
    );

    if plan.planned_state.is_object() && plan.changes.is_empty() {
        // A no-change plan carries the prior state, which still has the old id.
        plan.planned_state["id"] = Value::Null;
    }
    if let Value::Object(map) = &mut plan.planned_state {
        map.insert("schema_hash".to_string(), Value::String(new_hash.clone()));
    }
    plan.changes.retain(|c| c.path != "schema_hash");
    plan.changes.push(AttributeChange::modified(
        "schema_hash",
        Value::String(old_hash.to_string()),
        Value::String(new_hash.clone()),
    ));
    plan.requires_replace = true;

    Ok(plan.with_diagnostic(
        Diagnostic::warning(SCHEMA_FILE_CHANGED)
            .with_detail(format!(
                "The file {} has changed from when the resource was originally created, \
                 this forces the destruction of the resource. Old file hash: {}, New file hash: {}",
                proposed_path, old_hash, new_hash
            ))
            .with_attribute("schema_hash"),
    ))
}

#[async_trait]
impl Resource for SchemaResource {
    type State = SchemaState;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Schema
    }

    fn plan(&self, prior: Option<Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
        let proposed_path = proposed
            .get("schema")
            .and_then(Value::as_str)
            .map(str::to_string);
        let plan = plan_replace(&self.kind().schema(), prior.clone(), proposed);

        match (prior, proposed_path) {
            (Some(prior), Some(path)) => check_drift(plan, &prior, &path),
            _ => Ok(plan),
        }
    }

    async fn create(&self, mut planned: SchemaState) -> Result<SchemaState, ProviderError> {
        // Hash first: an unreadable bundle must stop the create before anything is placed.
        let hash = hash_file(&planned.schema)?;

        let request = SchemaRequest {
            x: planned.x,
            y: planned.y,
            z: planned.z,
            rotation: planned.rotation.unwrap_or(0),
            schema: PathBuf::from(&planned.schema),
        };
        let id = self.client.create_schema(&request).await?;
        info!(id = %id, schema = %planned.schema, "Created schema");

        planned.schema_hash = Some(hash);
        planned.id = Some(id);
        Ok(planned)
    }

    async fn read(
        &self,
        current: SchemaState,
    ) -> Result<(SchemaState, Vec<Diagnostic>), ProviderError> {
        let Some(id) = current.id.as_deref() else {
            return Ok((current, Vec::new()));
        };

        match self.client.get_schema_details(id).await? {
            Some(details) => {
                debug!(id = %id, ?details, "Read schema");
                Ok((current, Vec::new()))
            },
            None => {
                warn!(id = %id, "Schema no longer exists on the server");
                let diagnostic = Diagnostic::warning(SCHEMA_NOT_FOUND)
                    .with_detail(format!(
                        "The schema with id {} was not found on the server, it may have been \
                         removed outside of this provider. Remove it from state or re-create it.",
                        id
                    ))
                    .with_attribute("id");
                Ok((current, vec![diagnostic]))
            },
        }
    }

    async fn delete(&self, current: SchemaState) -> Result<(), ProviderError> {
        let id = current.id.as_deref().ok_or_else(|| {
            ProviderError::InvalidState(format!(
                "schema at {}/{}/{} has no id, it was never created",
                current.x, current.y, current.z
            ))
        })?;

        self.client.undo_schema(id).await?;
        info!(id = %id, "Undid schema");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<SchemaState, ProviderError> {
        let details = self
            .client
            .get_schema_details(id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("schema {}", id)))?;

        // The bundle path and rotation are unknown, so the next plan replaces
        // the schema unless the configuration is adjusted to match.
        Ok(SchemaState {
            x: details.start_x,
            y: details.start_y,
            z: details.start_z,
            rotation: None,
            schema: String::new(),
            schema_hash: None,
            id: Some(id.to_string()),
        })
    }
}
