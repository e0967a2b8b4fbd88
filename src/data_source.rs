//! The `minecraft_block` data source: look up the block at given coordinates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::MinecraftClient;
use crate::error::ProviderError;
use crate::resources::{check_config, whole_number, BlockState};
use crate::schema::{Attribute, Schema};

/// Type name of the block data source.
pub const BLOCK_DATA_SOURCE: &str = "minecraft_block";

const READ_FAILED: &str = "Unable to retrieve block";

/// Result of a block lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// X coordinate.
    #[serde(deserialize_with = "whole_number")]
    pub x: i64,
    /// Y coordinate.
    #[serde(deserialize_with = "whole_number")]
    pub y: i64,
    /// Z coordinate.
    #[serde(deserialize_with = "whole_number")]
    pub z: i64,
    /// Material found at the coordinates.
    #[serde(default)]
    pub material: Option<String>,
    /// Block identifier.
    #[serde(default)]
    pub id: Option<String>,
}

/// Reads blocks without managing them.
#[derive(Debug, Clone)]
pub struct BlockDataSource {
    client: Arc<MinecraftClient>,
}

impl BlockDataSource {
    /// Create the data source around a shared client.
    pub fn new(client: Arc<MinecraftClient>) -> Self {
        Self { client }
    }

    /// Attribute schema of the data source.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Looks up a block in the Minecraft world")
            .with_attribute("x", Attribute::required_int64())
            .with_attribute("y", Attribute::required_int64())
            .with_attribute("z", Attribute::required_int64())
            .with_attribute(
                "material",
                Attribute::computed_string().with_description("Material of the block"),
            )
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Block identifier"),
            )
    }

    /// Fetch the block described by `config`.
    pub async fn read(&self, config: Value) -> Result<Value, ProviderError> {
        check_config(&Self::schema(), &config)?;
        let mut data: BlockData = serde_json::from_value(config)?;

        let block = self
            .client
            .get_block(data.x, data.y, data.z)
            .await
            .map_err(|source| ProviderError::DataSource {
                summary: READ_FAILED,
                source,
            })?;
        debug!(x = data.x, y = data.y, z = data.z, material = %block.material, "Read block data");

        data.id = Some(if block.id.is_empty() {
            BlockState::id_for(data.x, data.y, data.z)
        } else {
            block.id
        });
        data.material = Some(block.material);
        Ok(serde_json::to_value(data)?)
    }
}
