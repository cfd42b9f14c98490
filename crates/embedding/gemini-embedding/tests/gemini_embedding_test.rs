//! Integration tests for the Gemini embedding service.
//!
//! Mocked tests run against a local `mockito` server. Tests that call the real API are
//! marked with `#[ignore]` and require `GEMINI_API_KEY` (or `GOOGLE_API_KEY`).

use std::path::Path;

use embedding::EmbeddingService;
use gemini_embedding::GeminiEmbedding;
use serde_json::json;

/// Loads `.env` from the workspace root so the API key is available in ignored tests.
fn load_root_env() {
    let root_env = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../.env");
    let _ = dotenvy::from_path(root_env);
}

fn service_for(server: &mockito::Server) -> GeminiEmbedding {
    GeminiEmbedding::new_with_base_url(
        "g-test".to_string(),
        "text-embedding-004".to_string(),
        Some(&server.url()),
    )
}

#[tokio::test]
async fn test_gemini_embed_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/text-embedding-004:embedContent")
        .match_header("x-goog-api-key", "g-test")
        .match_body(mockito::Matcher::Json(
            json!({"content": {"parts": [{"text": "hello"}]}}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"embedding": {"values": [0.1, 0.2, 0.3]}}).to_string())
        .create_async()
        .await;

    let embedding = service_for(&server).embed("hello").await.unwrap();

    assert_eq!(embedding.vector, vec![0.1, 0.2, 0.3]);
    assert!(embedding.usage.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_batch_embed_contents_keeps_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/text-embedding-004:batchEmbedContents")
        .match_body(mockito::Matcher::Json(json!({"requests": [
            {"model": "models/text-embedding-004", "content": {"parts": [{"text": "a"}]}},
            {"model": "models/text-embedding-004", "content": {"parts": [{"text": "b"}]}},
            {"model": "models/text-embedding-004", "content": {"parts": [{"text": "c"}]}}
        ]})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"embeddings": [
                {"values": [97.0]},
                {"values": [98.0]},
                {"values": [99.0]}
            ]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let embeddings = service_for(&server).embed_batch(&texts).await.unwrap();

    assert_eq!(embeddings.vectors, vec![vec![97.0], vec![98.0], vec![99.0]]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gemini_short_batch_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/text-embedding-004:batchEmbedContents")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"embeddings": [{"values": [1.0]}]}).to_string())
        .create_async()
        .await;

    let texts = vec!["a".to_string(), "b".to_string()];
    assert!(service_for(&server).embed_batch(&texts).await.is_err());
}

#[tokio::test]
async fn test_gemini_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/text-embedding-004:embedContent")
        .with_status(400)
        .with_body(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
        .create_async()
        .await;

    let err = service_for(&server).embed("hello").await.unwrap_err();
    assert!(err.to_string().contains("API key not valid"), "{err}");
}

#[tokio::test]
async fn test_gemini_health_check_gets_model() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/models/text-embedding-004")
        .match_header("x-goog-api-key", "g-test")
        .with_status(200)
        .with_body(r#"{"name":"models/text-embedding-004"}"#)
        .create_async()
        .await;

    service_for(&server).health_check().await.unwrap();
    mock.assert_async().await;

    let no_key = GeminiEmbedding::with_api_key(String::new());
    assert!(no_key.health_check().await.is_err());
}

#[test]
fn test_gemini_model_dimensions() {
    let service = GeminiEmbedding::with_api_key("k".to_string());
    assert_eq!(service.model(), "text-embedding-004");
    assert_eq!(service.dimensions(), 768);
    let large = service.with_model("models/gemini-embedding-001".to_string());
    assert_eq!(large.dimensions(), 3072);
}

#[tokio::test]
#[ignore] // Requires API key, run with: cargo test -p gemini-embedding -- --ignored
async fn test_gemini_embedding() {
    load_root_env();
    let api_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .expect("GEMINI_API_KEY or GOOGLE_API_KEY must be set for this test (or set in root .env)");

    let service = GeminiEmbedding::with_api_key(api_key);
    let embedding = service.embed("Hello world").await.unwrap();
    assert_eq!(embedding.vector.len(), 768);
}
