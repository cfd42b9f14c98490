//! Integration tests for the Mistral embedding service.
//!
//! Mocked tests point [`mistral_embedding::MistralEmbedding`] at a local `mockito` server.
//! Tests that call the real API are marked with `#[ignore]` and require `MISTRAL_API_KEY`.
//!
//! # Running tests
//!
//! - **Default (no API):** `cargo test -p mistral-embedding`
//! - **With API:** `cargo test -p mistral-embedding -- --ignored`; set `MISTRAL_API_KEY`
//!   (e.g. in repo root `.env`).

use std::path::Path;

use embedding::EmbeddingService;
use mistral_embedding::MistralEmbedding;
use serde_json::json;

/// Loads `.env` from the workspace root so `MISTRAL_API_KEY` is available in ignored tests.
/// Path: `crates/embedding/mistral-embedding` → `../../../.env` = repo root.
fn load_root_env() {
    let root_env = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../.env");
    let _ = dotenvy::from_path(root_env);
}

fn service_for(server: &mockito::Server) -> MistralEmbedding {
    MistralEmbedding::new_with_base_url(
        "mistral-test".to_string(),
        "mistral-embed".to_string(),
        Some(&server.url()),
    )
}

#[tokio::test]
async fn test_mistral_embed_sends_bearer_and_parses_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer mistral-test")
        .match_body(mockito::Matcher::Json(
            json!({"model": "mistral-embed", "input": "hello"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "emb-1",
                "object": "list",
                "model": "mistral-embed",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.25, 0.5]}],
                "usage": {"prompt_tokens": 2, "total_tokens": 2}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let embedding = service_for(&server).embed("hello").await.unwrap();

    assert_eq!(embedding.vector, vec![0.25, 0.5]);
    assert_eq!(embedding.usage.and_then(|u| u.total_tokens), Some(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_mistral_batch_sorted_by_index() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/embeddings")
        .match_body(mockito::Matcher::Json(
            json!({"model": "mistral-embed", "input": ["a", "b"]}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": [
                    {"index": 1, "embedding": [2.0]},
                    {"index": 0, "embedding": [1.0]}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let texts = vec!["a".to_string(), "b".to_string()];
    let embeddings = service_for(&server).embed_batch(&texts).await.unwrap();

    assert_eq!(embeddings.vectors, vec![vec![1.0], vec![2.0]]);
    assert!(embeddings.usage.is_none());
}

async fn batch_with_indices(indices: &[usize]) -> anyhow::Result<Vec<Vec<f32>>> {
    let mut server = mockito::Server::new_async().await;
    let data: Vec<_> = indices
        .iter()
        .enumerate()
        .map(|(i, index)| json!({"index": index, "embedding": [i as f32]}))
        .collect();
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": data }).to_string())
        .create_async()
        .await;

    let texts: Vec<String> = (0..indices.len()).map(|i| format!("t{i}")).collect();
    let embeddings = service_for(&server).embed_batch(&texts).await?;
    Ok(embeddings.vectors)
}

#[tokio::test]
async fn test_mistral_batch_duplicate_index_fails() {
    let err = batch_with_indices(&[1, 1]).await.unwrap_err();
    assert!(err.to_string().contains("index"), "{err}");
}

#[tokio::test]
async fn test_mistral_batch_index_gap_fails() {
    assert!(batch_with_indices(&[0, 2]).await.is_err());
    assert!(batch_with_indices(&[0, 1]).await.is_ok());
}

#[tokio::test]
async fn test_mistral_api_error_includes_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(401)
        .with_body(r#"{"message":"Unauthorized"}"#)
        .create_async()
        .await;

    let err = service_for(&server).embed("hello").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("Unauthorized"), "{message}");
}

#[tokio::test]
async fn test_mistral_health_check() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/models")
        .match_header("authorization", "Bearer mistral-test")
        .with_status(200)
        .with_body(r#"{"object":"list","data":[]}"#)
        .create_async()
        .await;

    service_for(&server).health_check().await.unwrap();
    ok.assert_async().await;

    let missing_key = MistralEmbedding::new_with_base_url(
        String::new(),
        "mistral-embed".to_string(),
        Some(&server.url()),
    );
    assert!(missing_key.health_check().await.is_err());
}

#[tokio::test]
async fn test_mistral_health_check_rejected_key() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/models")
        .with_status(401)
        .create_async()
        .await;

    assert!(service_for(&server).health_check().await.is_err());
}

/// **Test: Construction with default model (no API call).**
#[test]
fn test_mistral_embedding_default_model() {
    let service = MistralEmbedding::with_api_key("k".to_string());
    assert_eq!(service.model(), "mistral-embed");
    assert_eq!(service.dimensions(), 1024);
    assert_eq!(service.name(), "mistral");
}

/// **Test: Single-text embedding (real API).**
///
/// **Expected:** Returns an embedding vector of length 1024 (mistral-embed dimension).
///
/// **Note:** Ignored by default; run with `cargo test -p mistral-embedding -- --ignored`.
#[tokio::test]
#[ignore] // Requires API key, run with: cargo test -p mistral-embedding -- --ignored
async fn test_mistral_embedding() {
    load_root_env();
    let api_key = std::env::var("MISTRAL_API_KEY")
        .expect("MISTRAL_API_KEY environment variable must be set for this test (or set in root .env)");

    let service = MistralEmbedding::with_api_key(api_key);

    let embedding = service.embed("Hello world").await.unwrap();
    assert_eq!(embedding.vector.len(), 1024);
}

/// **Test: Batch embedding (real API).**
///
/// **Expected:** Returns three vectors of length 1024, in input order.
#[tokio::test]
#[ignore]
async fn test_mistral_embedding_batch() {
    load_root_env();
    let api_key = std::env::var("MISTRAL_API_KEY")
        .expect("MISTRAL_API_KEY environment variable must be set for this test (or set in root .env)");

    let service = MistralEmbedding::with_api_key(api_key);
    let texts = vec![
        "Hello".to_string(),
        "World".to_string(),
        "Goodbye".to_string(),
    ];

    let embeddings = service.embed_batch(&texts).await.unwrap();
    assert_eq!(embeddings.vectors.len(), 3);
    for vector in embeddings.vectors {
        assert_eq!(vector.len(), 1024);
    }
}
