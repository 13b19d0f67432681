//! ABOUTME: HTTP embedder driver against a configured `embedder_url` (e.g. an Ollama-compatible server)

use std::time::Duration;

use async_trait::async_trait;
use docbro_core::prelude::{DocBroError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::traits::{Embedder, EmbedderHealth};

const BATCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct RemoteEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl RemoteEmbedder {
    #[must_use]
    pub fn new(base_url: String, model: String, dimensions: usize) -> Self {
        let client = Client::builder().pool_max_idle_per_host(8).build().expect("failed to build reqwest client");
        Self { client, base_url, model, dimensions }
    }

    fn url(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.client.post(self.url()).json(&EmbedRequest { model: &self.model, input: texts }).send();
        let response = tokio::time::timeout(BATCH_TIMEOUT, request)
            .await
            .map_err(|_| DocBroError::EmbedTimeout { elapsed_ms: BATCH_TIMEOUT.as_millis() as u64 })?
            .map_err(|e| DocBroError::EmbedBackendUnavailable { message: e.to_string() })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocBroError::EmbedBackendUnavailable { message: format!("{status}: {body}") });
        }

        let parsed: EmbedResponse =
            response.json().await.map_err(|e| DocBroError::EmbedBackendUnavailable { message: e.to_string() })?;
        Ok(parsed.embeddings)
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    async fn health(&self) -> EmbedderHealth {
        let ping = self.client.get(format!("{}/api/tags", self.base_url.trim_end_matches('/'))).send().await;
        EmbedderHealth { ok: ping.is_ok_and(|r| r.status().is_success()), model: self.model.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn embed_batch_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]]
            })))
            .mount(&server)
            .await;
        let embedder = RemoteEmbedder::new(server.uri(), "mxbai-embed-large".to_string(), 2);
        let out = embedder.embed_batch(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(out, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let embedder = RemoteEmbedder::new("http://127.0.0.1:1".to_string(), "m".to_string(), 4);
        let out = embedder.embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn server_error_surfaces_as_backend_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let embedder = RemoteEmbedder::new(server.uri(), "m".to_string(), 2);
        let err = embedder.embed_batch(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, DocBroError::EmbedBackendUnavailable { .. }));
    }
}
