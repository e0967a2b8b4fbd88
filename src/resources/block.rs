//! The `minecraft_block` resource: one block at fixed coordinates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Resource, ResourceKind};
use crate::client::{BlockRequest, MinecraftClient};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Persisted state of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    /// X coordinate.
    #[serde(deserialize_with = "super::whole_number")]
    pub x: i64,
    /// Y coordinate.
    #[serde(deserialize_with = "super::whole_number")]
    pub y: i64,
    /// Z coordinate.
    #[serde(deserialize_with = "super::whole_number")]
    pub z: i64,
    /// Material identifier, e.g. `minecraft:stone`.
    pub material: String,
    /// `"{x}_{y}_{z}"`, set on create.
    #[serde(default)]
    pub id: Option<String>,
}

impl BlockState {
    /// The identity of a block at the given coordinates.
    pub fn id_for(x: i64, y: i64, z: i64) -> String {
        format!("{}_{}_{}", x, y, z)
    }

    /// Parse an identity back into coordinates.
    pub fn parse_id(id: &str) -> Option<(i64, i64, i64)> {
        let mut parts = id.split('_');
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((x, y, z))
    }

    fn request(&self) -> BlockRequest {
        BlockRequest {
            x: self.x,
            y: self.y,
            z: self.z,
            material: self.material.clone(),
        }
    }
}

pub(super) fn resource_schema() -> Schema {
    Schema::v0()
        .with_description("A single block in the Minecraft world")
        .with_attribute(
            "x",
            Attribute::required_int64()
                .with_description("X coordinate of the block")
                .with_force_new(),
        )
        .with_attribute(
            "y",
            Attribute::required_int64()
                .with_description("Y coordinate of the block")
                .with_force_new(),
        )
        .with_attribute(
            "z",
            Attribute::required_int64()
                .with_description("Z coordinate of the block")
                .with_force_new(),
        )
        .with_attribute(
            "material",
            Attribute::required_string()
                .with_description("Material of the block, e.g. minecraft:stone")
                .with_force_new(),
        )
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("Block identifier, x_y_z"),
        )
}

/// Reconciler for `minecraft_block`.
#[derive(Debug, Clone)]
pub struct BlockResource {
    client: Arc<MinecraftClient>,
}

impl BlockResource {
    /// Create the reconciler around a shared client.
    pub fn new(client: Arc<MinecraftClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for BlockResource {
    type State = BlockState;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Block
    }

    async fn create(&self, mut planned: BlockState) -> Result<BlockState, ProviderError> {
        self.client.create_block(&planned.request()).await?;

        let id = BlockState::id_for(planned.x, planned.y, planned.z);
        info!(id = %id, material = %planned.material, "Created block");
        planned.id = Some(id);
        Ok(planned)
    }

    async fn read(
        &self,
        mut current: BlockState,
    ) -> Result<(BlockState, Vec<Diagnostic>), ProviderError> {
        let block = self
            .client
            .get_block(current.x, current.y, current.z)
            .await?;
        debug!(x = block.x, y = block.y, z = block.z, material = %block.material, "Read block");

        current.material = block.material;
        if current.id.is_none() {
            current.id = Some(BlockState::id_for(current.x, current.y, current.z));
        }
        Ok((current, Vec::new()))
    }

    async fn delete(&self, current: BlockState) -> Result<(), ProviderError> {
        self.client.delete_block(&current.request()).await?;
        info!(x = current.x, y = current.y, z = current.z, "Deleted block");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<BlockState, ProviderError> {
        let (x, y, z) = BlockState::parse_id(id).ok_or_else(|| {
            ProviderError::Validation(format!(
                "Invalid block id '{}', expected x_y_z with integer coordinates",
                id
            ))
        })?;
        let block = self.client.get_block(x, y, z).await?;
        Ok(BlockState {
            x,
            y,
            z,
            material: block.material,
            id: Some(BlockState::id_for(x, y, z)),
        })
    }
}
