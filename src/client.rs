//! HTTP client for the Minecraft REST API.
//!
//! Every call is a single authenticated request with no retries. Non-200
//! responses become [`ClientError::Status`] carrying the status code and raw
//! body. The client holds nothing but the immutable connection settings, so
//! one instance is shared by every reconciler.

use std::path::{Path, PathBuf};

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ClientError;

/// Header carrying the API key.
pub const AUTH_HEADER: &str = "X-API-Key";

/// Content type of an uploaded schema bundle.
pub const BUNDLE_CONTENT_TYPE: &str = "application/zip";

/// Maximum length of response body to log.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// A block placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
    /// Z coordinate.
    pub z: i64,
    /// Material identifier, e.g. `minecraft:stone`.
    pub material: String,
}

/// A block as reported by the server. Absent fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockResponse {
    /// Server-side identifier.
    pub id: String,
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
    /// Z coordinate.
    pub z: i64,
    /// Material identifier.
    pub material: String,
}

/// A schema placement request. The bundle at `schema` is uploaded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRequest {
    /// X coordinate of the origin.
    pub x: i64,
    /// Y coordinate of the origin.
    pub y: i64,
    /// Z coordinate of the origin.
    pub z: i64,
    /// Rotation in degrees.
    pub rotation: i64,
    /// Path to the local bundle file.
    pub schema: PathBuf,
}

/// Bounding box of a placed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDetails {
    /// Minimum X.
    pub start_x: i64,
    /// Minimum Y.
    pub start_y: i64,
    /// Minimum Z.
    pub start_z: i64,
    /// Maximum X.
    pub end_x: i64,
    /// Maximum Y.
    pub end_y: i64,
    /// Maximum Z.
    pub end_z: i64,
}

/// Client for the Minecraft API.
#[derive(Debug, Clone)]
pub struct MinecraftClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl MinecraftClient {
    /// Create a client from resolved provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("minecraft-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Place a block. Returns the block as stored by the server.
    pub async fn create_block(&self, block: &BlockRequest) -> Result<BlockResponse, ClientError> {
        let url = format!("{}/v1/block", self.endpoint);
        let response = self
            .send(Method::POST, &url, |req| req.json(block))
            .await?;
        decode_json(&url, response).await
    }

    /// Fetch the block at the given coordinates.
    ///
    /// A missing block surfaces as [`ClientError::Status`]; callers that care
    /// can check [`ClientError::is_not_found`].
    pub async fn get_block(&self, x: i64, y: i64, z: i64) -> Result<BlockResponse, ClientError> {
        let url = self.block_url(x, y, z);
        let response = self.send(Method::GET, &url, |req| req).await?;
        decode_json(&url, response).await
    }

    /// Remove the block at the request's coordinates.
    pub async fn delete_block(&self, block: &BlockRequest) -> Result<(), ClientError> {
        let url = self.block_url(block.x, block.y, block.z);
        self.send(Method::DELETE, &url, |req| req).await?;
        Ok(())
    }

    /// Upload a schema bundle and place it. Returns the id needed to undo it.
    pub async fn create_schema(&self, schema: &SchemaRequest) -> Result<String, ClientError> {
        let url = format!(
            "{}/v1/schema/{}/{}/{}/{}",
            self.endpoint, schema.x, schema.y, schema.z, schema.rotation
        );
        let bundle = read_bundle(&schema.schema).await?;

        let response = self
            .send(Method::POST, &url, |req| {
                req.header(header::CONTENT_TYPE, BUNDLE_CONTENT_TYPE)
                    .body(bundle)
            })
            .await?;
        let id = response.text().await?;
        Ok(id.trim().to_string())
    }

    /// Fetch the bounding box of a placed schema.
    ///
    /// Returns `Ok(None)` when the server answers 404, meaning the schema
    /// was most likely removed out of band. Any other failure is an error.
    pub async fn get_schema_details(&self, id: &str) -> Result<Option<SchemaDetails>, ClientError> {
        let url = format!("{}/v1/schema/details/{}", self.endpoint, id);
        match self.send(Method::GET, &url, |req| req).await {
            Ok(response) => decode_json(&url, response).await.map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Undo a schema placement.
    pub async fn undo_schema(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/v1/schema/undo/{}", self.endpoint, id);
        self.send(Method::DELETE, &url, |req| req).await?;
        Ok(())
    }

    fn block_url(&self, x: i64, y: i64, z: i64) -> String {
        format!("{}/v1/block/{}/{}/{}", self.endpoint, x, y, z)
    }

    async fn send<F>(&self, method: Method, url: &str, build: F) -> Result<Response, ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        debug!(method = %method, url = %url, "Sending request");

        let request = self
            .http
            .request(method.clone(), url)
            .header(AUTH_HEADER, &self.api_key);
        let response = build(request).send().await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            body = %truncate_for_log(&body),
            "Request failed"
        );
        Err(ClientError::Status {
            method: method_name(&method),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

async fn read_bundle(path: &Path) -> Result<Vec<u8>, ClientError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::Bundle {
            path: path.to_path_buf(),
            source,
        })
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::DELETE => "DELETE",
        Method::PUT => "PUT",
        _ => "OTHER",
    }
}

fn truncate_for_log(body: &str) -> String {
    if body.len() <= MAX_LOG_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_LOG_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_request_json_shape() {
        let req = BlockRequest {
            x: -1273,
            y: 24,
            z: 288,
            material: "minecraft:stone".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"})
        );
    }

    #[test]
    fn test_block_response_is_lenient() {
        let block: BlockResponse =
            serde_json::from_value(serde_json::json!({"material": "minecraft:stone"})).unwrap();
        assert_eq!(block.id, "");
        assert_eq!(block.material, "minecraft:stone");
    }

    #[test]
    fn test_schema_details_camel_case() {
        let details: SchemaDetails = serde_json::from_value(serde_json::json!({
            "startX": 1, "startY": 2, "startZ": 3,
            "endX": 4, "endY": 5, "endZ": 6
        }))
        .unwrap();
        assert_eq!(details.start_x, 1);
        assert_eq!(details.end_z, 6);
    }

    #[test]
    fn test_block_url() {
        let client =
            MinecraftClient::new(&ProviderConfig::new("http://localhost:9090/", "key")).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9090");
        assert_eq!(
            client.block_url(-1273, 24, 288),
            "http://localhost:9090/v1/block/-1273/24/288"
        );
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short"), "short");
        let long = "é".repeat(150);
        let truncated = truncate_for_log(&long);
        assert!(truncated.contains("[truncated, 300 bytes total]"));
    }

    #[test]
    fn test_method_name() {
        assert_eq!(method_name(&Method::GET), "GET");
        assert_eq!(method_name(&Method::DELETE), "DELETE");
    }
}
