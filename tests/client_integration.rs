//! Integration tests for the Minecraft HTTP client using wiremock
//!
//! These tests pin down the wire format: paths, the API key header, the
//! schema upload body, and how non-200 responses are reported.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use minecraft_provider::client::{BlockRequest, SchemaRequest};
use minecraft_provider::{ClientError, MinecraftClient, ProviderConfig};
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> MinecraftClient {
    MinecraftClient::new(&ProviderConfig::new(server.uri(), API_KEY)).unwrap()
}

fn stone() -> BlockRequest {
    BlockRequest {
        x: -1273,
        y: 24,
        z: 288,
        material: "minecraft:stone".to_string(),
    }
}

fn bundle(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

mod block_tests {
    use super::*;

    /// Create posts the block as JSON and authenticates with the API key
    #[tokio::test]
    async fn test_create_block_sends_json_and_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/block"))
            .and(header("X-API-Key", API_KEY))
            .and(body_json(json!({
                "x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "", "x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let block = client_for(&server).create_block(&stone()).await.unwrap();
        assert_eq!(block.material, "minecraft:stone");
        assert_eq!((block.x, block.y, block.z), (-1273, 24, 288));
    }

    /// Get addresses the block by coordinates in the path
    #[tokio::test]
    async fn test_get_block() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/block/-1273/24/288"))
            .and(header("X-API-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "b-1", "x": -1273, "y": 24, "z": 288, "material": "minecraft:dirt"
            })))
            .mount(&server)
            .await;

        let block = client_for(&server).get_block(-1273, 24, 288).await.unwrap();
        assert_eq!(block.id, "b-1");
        assert_eq!(block.material, "minecraft:dirt");
    }

    /// A missing block is a status error that keeps the code and body
    #[tokio::test]
    async fn test_get_block_404_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/block/1/2/3"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no block at 1/2/3"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_block(1, 2, 3).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            ClientError::Status {
                method,
                status,
                body,
                ..
            } => {
                assert_eq!(method, "GET");
                assert_eq!(status, 404);
                assert_eq!(body, "no block at 1/2/3");
            },
            other => panic!("expected status error, got {:?}", other),
        }
    }

    /// A 200 whose body is not a block is a decode error
    #[tokio::test]
    async fn test_get_block_invalid_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/block/1/2/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_block(1, 2, 3).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    /// Delete uses the coordinates of the request
    #[tokio::test]
    async fn test_delete_block() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/block/-1273/24/288"))
            .and(header("X-API-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_block(&stone()).await.unwrap();
    }

    /// Anything but 200 is a failure, including other 2xx codes
    #[tokio::test]
    async fn test_non_200_success_code_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/block/-1273/24/288"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_block(&stone()).await.unwrap_err();
        assert_eq!(err.status(), Some(204));
    }

    /// Requests are bounded by the configured timeout
    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/block/1/2/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"x": 1, "y": 2, "z": 3, "material": "minecraft:stone"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ProviderConfig::new(server.uri(), API_KEY).with_timeout(Duration::from_millis(200));
        let client = MinecraftClient::new(&config).unwrap();

        let err = client.get_block(1, 2, 3).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    }
}

mod schema_tests {
    use super::*;

    fn car(path: PathBuf) -> SchemaRequest {
        SchemaRequest {
            x: -1278,
            y: 24,
            z: 288,
            rotation: 270,
            schema: path,
        }
    }

    /// The bundle is uploaded raw as application/zip; the body is the undo id
    #[tokio::test]
    async fn test_create_schema_uploads_bundle() {
        let server = MockServer::start().await;
        let file = bundle(b"PK\x03\x04car");

        Mock::given(method("POST"))
            .and(path("/v1/schema/-1278/24/288/270"))
            .and(header("X-API-Key", API_KEY))
            .and(header("Content-Type", "application/zip"))
            .and(body_bytes(b"PK\x03\x04car".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_string("undo-123\n"))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .create_schema(&car(file.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(id, "undo-123");
    }

    /// An unreadable bundle fails before any request is sent
    #[tokio::test]
    async fn test_create_schema_missing_bundle() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_schema(&car(dir.path().join("car.zip")))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Bundle { .. }));
    }

    /// Details decode the bounding box
    #[tokio::test]
    async fn test_get_schema_details() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/schema/details/undo-123"))
            .and(header("X-API-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startX": -1278, "startY": 24, "startZ": 288,
                "endX": -1270, "endY": 28, "endZ": 292
            })))
            .mount(&server)
            .await;

        let details = client_for(&server)
            .get_schema_details("undo-123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.start_x, -1278);
        assert_eq!(details.end_y, 28);
    }

    /// 404 means the schema is gone, not that the call failed
    #[tokio::test]
    async fn test_get_schema_details_404_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/schema/details/undo-123"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown schema"))
            .mount(&server)
            .await;

        let details = client_for(&server)
            .get_schema_details("undo-123")
            .await
            .unwrap();
        assert!(details.is_none());
    }

    /// Any other failure is still an error
    #[tokio::test]
    async fn test_get_schema_details_500_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/schema/details/undo-123"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_schema_details("undo-123")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("server exploded"));
    }

    /// Undo deletes by id
    #[tokio::test]
    async fn test_undo_schema() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/schema/undo/undo-123"))
            .and(header("X-API-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).undo_schema("undo-123").await.unwrap();
    }
}
