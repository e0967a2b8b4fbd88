//! Resource reconcilers.
//!
//! Each managed object kind implements [`Resource`]: plan, create, read,
//! update, and delete against typed state. Nothing in the Minecraft API can
//! be changed in place, so every declared attribute forces replacement and
//! `update` only persists the planned state.
//!
//! The host speaks JSON; [`Reconciler`] is the tagged set of concrete
//! reconcilers that decodes host values into typed state, dispatches, and
//! encodes the result back.

mod block;
mod schema;

pub use block::{BlockResource, BlockState};
pub use schema::{SchemaResource, SchemaState, SCHEMA_FILE_CHANGED};

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::MinecraftClient;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::types::{AttributeChange, ImportedResource, PlanResult, ReadResult};
use crate::validation;

/// The kinds of resource this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A single block, `minecraft_block`.
    Block,
    /// A placed schema bundle, `minecraft_schema`.
    Schema,
}

impl ResourceKind {
    /// Every kind, in registration order.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Block, ResourceKind::Schema];

    /// The host-facing type name.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Block => "minecraft_block",
            Self::Schema => "minecraft_schema",
        }
    }

    /// Look a kind up by its host-facing type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// The attribute schema for this kind.
    pub fn schema(self) -> Schema {
        match self {
            Self::Block => block::resource_schema(),
            Self::Schema => schema::resource_schema(),
        }
    }
}

/// The create/read/update/delete contract for one resource kind.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Persisted state of one resource instance.
    type State: Serialize + DeserializeOwned + Send + 'static;

    /// Which kind this reconciler manages.
    fn kind(&self) -> ResourceKind;

    /// Plan the transition from `prior` to `proposed`.
    ///
    /// The default treats every declared attribute as replace-only.
    fn plan(&self, prior: Option<Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
        Ok(plan_replace(&self.kind().schema(), prior, proposed))
    }

    /// Create the remote object and return the state to persist.
    async fn create(&self, planned: Self::State) -> Result<Self::State, ProviderError>;

    /// Refresh the state from the remote object.
    async fn read(
        &self,
        current: Self::State,
    ) -> Result<(Self::State, Vec<Diagnostic>), ProviderError>;

    /// Nothing is mutable in place; persist the planned state unchanged.
    async fn update(
        &self,
        _prior: Self::State,
        planned: Self::State,
    ) -> Result<Self::State, ProviderError> {
        Ok(planned)
    }

    /// Destroy the remote object.
    async fn delete(&self, current: Self::State) -> Result<(), ProviderError>;

    /// Build state for an existing remote object from its id.
    async fn import(&self, id: &str) -> Result<Self::State, ProviderError>;
}

/// A concrete reconciler, tagged by kind.
#[derive(Debug, Clone)]
pub enum Reconciler {
    /// Reconciles `minecraft_block`.
    Block(BlockResource),
    /// Reconciles `minecraft_schema`.
    Schema(SchemaResource),
}

impl Reconciler {
    /// Build the reconciler for `kind` around a shared client.
    pub fn new(kind: ResourceKind, client: Arc<MinecraftClient>) -> Self {
        match kind {
            ResourceKind::Block => Self::Block(BlockResource::new(client)),
            ResourceKind::Schema => Self::Schema(SchemaResource::new(client)),
        }
    }

    /// Which kind this reconciler manages.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Block(r) => r.kind(),
            Self::Schema(r) => r.kind(),
        }
    }

    /// Plan a change. A `null` proposed state plans a destroy.
    pub fn plan(&self, prior: Option<Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
        let prior = prior.filter(|v| !v.is_null());
        if proposed.is_null() {
            return Ok(plan_destroy(prior));
        }
        match self {
            Self::Block(r) => r.plan(prior, proposed),
            Self::Schema(r) => r.plan(prior, proposed),
        }
    }

    /// Validate and create.
    pub async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        match self {
            Self::Block(r) => create_with(r, planned).await,
            Self::Schema(r) => create_with(r, planned).await,
        }
    }

    /// Refresh persisted state.
    pub async fn read(&self, current: Value) -> Result<ReadResult, ProviderError> {
        match self {
            Self::Block(r) => read_with(r, current).await,
            Self::Schema(r) => read_with(r, current).await,
        }
    }

    /// Persist planned state.
    pub async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        match self {
            Self::Block(r) => update_with(r, prior, planned).await,
            Self::Schema(r) => update_with(r, prior, planned).await,
        }
    }

    /// Destroy.
    pub async fn delete(&self, current: Value) -> Result<(), ProviderError> {
        match self {
            Self::Block(r) => r.delete(serde_json::from_value(current)?).await,
            Self::Schema(r) => r.delete(serde_json::from_value(current)?).await,
        }
    }

    /// Import by id.
    pub async fn import(&self, id: &str) -> Result<ImportedResource, ProviderError> {
        let state = match self {
            Self::Block(r) => serde_json::to_value(r.import(id).await?)?,
            Self::Schema(r) => serde_json::to_value(r.import(id).await?)?,
        };
        Ok(ImportedResource::new(self.kind().type_name(), state))
    }
}

async fn create_with<R: Resource>(resource: &R, planned: Value) -> Result<Value, ProviderError> {
    check_config(&resource.kind().schema(), &planned)?;
    let state: R::State = serde_json::from_value(planned)?;
    let created = resource.create(state).await?;
    Ok(serde_json::to_value(created)?)
}

async fn read_with<R: Resource>(resource: &R, current: Value) -> Result<ReadResult, ProviderError> {
    let state: R::State = serde_json::from_value(current)?;
    let (state, diagnostics) = resource.read(state).await?;
    Ok(ReadResult {
        state: serde_json::to_value(state)?,
        diagnostics,
    })
}

async fn update_with<R: Resource>(
    resource: &R,
    prior: Value,
    planned: Value,
) -> Result<Value, ProviderError> {
    let prior: R::State = serde_json::from_value(prior)?;
    let planned: R::State = serde_json::from_value(planned)?;
    let updated = resource.update(prior, planned).await?;
    Ok(serde_json::to_value(updated)?)
}

/// Reject a configuration that does not match the schema.
pub(crate) fn check_config(schema: &Schema, config: &Value) -> Result<(), ProviderError> {
    validation::validate_result(schema, config).map_err(|diagnostics| {
        let messages: Vec<String> = diagnostics
            .into_iter()
            .map(|d| match d.detail {
                Some(detail) => format!("{} ({})", d.summary, detail),
                None => d.summary,
            })
            .collect();
        ProviderError::Validation(messages.join("; "))
    })
}

/// Plan for a replace-only resource.
///
/// - No prior state: every configured attribute is added, computed attributes are unknown.
/// - A declared attribute differs: replacement, computed attributes become unknown.
/// - Otherwise: no change, and the prior state (with its computed values) is kept.
pub fn plan_replace(schema: &Schema, prior: Option<Value>, proposed: Value) -> PlanResult {
    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort_unstable();

    let Some(prior) = prior else {
        let mut planned = proposed;
        let mut changes = Vec::new();
        for name in names {
            let attr = &schema.attributes[name];
            if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
                set_attr(&mut planned, name, Value::Null);
                continue;
            }
            let value = attr_value(&planned, name);
            if !value.is_null() {
                changes.push(AttributeChange::added(name.as_str(), value));
            }
        }
        return PlanResult::with_changes(planned, changes, false);
    };

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in &names {
        let attr = &schema.attributes[name.as_str()];
        if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
            continue;
        }
        let before = attr_value(&prior, name);
        let after = attr_value(&proposed, name);
        if !values_equal(&before, &after) {
            requires_replace |= attr.force_new;
            changes.push(AttributeChange::modified(name.as_str(), before, after));
        }
    }

    if changes.is_empty() {
        return PlanResult::no_change(prior);
    }

    let mut planned = proposed;
    for name in names {
        let attr = &schema.attributes[name];
        if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
            let value = if requires_replace {
                Value::Null
            } else {
                attr_value(&prior, name)
            };
            set_attr(&mut planned, name, value);
        }
    }
    PlanResult::with_changes(planned, changes, requires_replace)
}

/// Plan the destruction of a resource.
pub fn plan_destroy(prior: Option<Value>) -> PlanResult {
    let changes = match &prior {
        Some(Value::Object(map)) => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort_unstable();
            names
                .into_iter()
                .filter(|name| !map[name.as_str()].is_null())
                .map(|name| AttributeChange::removed(name.as_str(), map[name.as_str()].clone()))
                .collect()
        },
        _ => Vec::new(),
    };
    PlanResult::with_changes(Value::Null, changes, false)
}

fn attr_value(state: &Value, name: &str) -> Value {
    state.get(name).cloned().unwrap_or(Value::Null)
}

fn set_attr(state: &mut Value, name: &str, value: Value) {
    if let Value::Object(map) = state {
        map.insert(name.to_string(), value);
    }
}

/// Accept `288` and `288.0` alike for integer attributes.
pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    n.as_i64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", n)))
}

/// [`whole_number`] for optional attributes.
pub(crate) fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "whole_number")] i64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(n)| n))
}

// 288 and 288.0 are the same coordinate.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}
