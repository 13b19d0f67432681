//! ABOUTME: Remote VectorStore driver — HTTP client to an external vector service (spec §4.B)

use std::time::Duration;

use async_trait::async_trait;
use docbro_core::prelude::{DocBroError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{VectorFilter, VectorHealth, VectorHit, VectorPoint, VectorStore};

const RETRY_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Serialize)]
struct EnsureCollectionRequest<'a> {
    name: &'a str,
    dim: usize,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorPoint],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<VectorFilter>,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<VectorHit>,
}

#[derive(Serialize)]
struct DeleteByFilterRequest {
    filter: VectorFilter,
}

/// Thin HTTP client over an external vector service, reached at `base_url`.
/// Every mutating/search call is retried up to [`RETRY_ATTEMPTS`] times with
/// exponential backoff (100ms, 200ms, 400ms ...) on transport errors and 5xx
/// responses; 4xx responses are treated as non-retryable failures.
pub struct RemoteVectorStore {
    client: Client,
    base_url: String,
}

impl RemoteVectorStore {
    /// # Panics
    /// Panics if the underlying reqwest client fails to build (e.g. invalid
    /// TLS configuration), mirroring `reqwest::Client::new`'s own contract.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .build()
            .expect("failed to build reqwest client");
        Self { client, base_url }
    }

    async fn with_retry<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
        T: for<'de> Deserialize<'de> + Default,
    {
        let mut backoff = BASE_BACKOFF;
        let mut last_err = None;
        for attempt in 0..RETRY_ATTEMPTS {
            match op().await {
                Ok(response) if response.status().is_success() => {
                    if response.content_length() == Some(0) {
                        return Ok(T::default());
                    }
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| DocBroError::VectorBackendUnavailable { message: e.to_string() });
                }
                Ok(response) if response.status().is_client_error() => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(DocBroError::VectorBackendUnavailable {
                        message: format!("client error {status}: {body}"),
                    });
                }
                Ok(response) => {
                    last_err = Some(format!("server responded {}", response.status()));
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                }
            }
            if attempt + 1 < RETRY_ATTEMPTS {
                tokio::time::sleep(backoff).await;
                backoff *= 4;
            }
        }
        Err(DocBroError::VectorBackendUnavailable { message: last_err.unwrap_or_else(|| "unknown error".to_string()) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Deserialize, Default)]
struct Empty {}

#[async_trait]
impl VectorStore for RemoteVectorStore {
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()> {
        let url = self.url(&format!("collections/{name}"));
        self.with_retry::<_, _, Empty>(|| {
            self.client.put(&url).json(&EnsureCollectionRequest { name, dim }).send()
        })
        .await?;
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<VectorPoint>) -> Result<()> {
        let url = self.url(&format!("collections/{name}/points"));
        let result = self
            .with_retry::<_, _, Empty>(|| self.client.post(&url).json(&UpsertRequest { points: &points }).send())
            .await;
        result.map_err(|e| match e {
            DocBroError::VectorBackendUnavailable { message } if message.contains(&StatusCode::BAD_REQUEST.to_string()) => {
                DocBroError::VectorDimError { expected: 0, actual: 0 }
            }
            other => other,
        })
    }

    async fn search(&self, name: &str, query_vector: &[f32], top_k: usize, filter: Option<VectorFilter>) -> Result<Vec<VectorHit>> {
        let url = self.url(&format!("collections/{name}/search"));
        let response = self
            .with_retry::<_, _, SearchResponse>(|| {
                self.client
                    .post(&url)
                    .json(&SearchRequest { vector: query_vector, top_k, filter: filter.clone() })
                    .send()
            })
            .await?;
        Ok(response.hits)
    }

    async fn delete_by_filter(&self, name: &str, filter: VectorFilter) -> Result<()> {
        let url = self.url(&format!("collections/{name}/delete"));
        self.with_retry::<_, _, Empty>(|| {
            self.client.post(&url).json(&DeleteByFilterRequest { filter: filter.clone() }).send()
        })
        .await?;
        Ok(())
    }

    async fn health(&self) -> VectorHealth {
        let url = self.url("health");
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => VectorHealth { ok: true, backend: "remote".to_string() },
            _ => VectorHealth { ok: false, backend: "remote".to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ensure_collection_succeeds_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/collections/box1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        let store = RemoteVectorStore::new(server.uri());
        store.ensure_collection("box1", 8).await.unwrap();
    }

    #[tokio::test]
    async fn search_retries_on_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/box1/search"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/collections/box1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "hits": [] })))
            .mount(&server)
            .await;
        let store = RemoteVectorStore::new(server.uri());
        let hits = store.search("box1", &[0.1, 0.2], 5, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/box1/points"))
            .respond_with(ResponseTemplate::new(400).set_body_string("dimension mismatch"))
            .expect(1)
            .mount(&server)
            .await;
        let store = RemoteVectorStore::new(server.uri());
        let err = store.upsert("box1", vec![]).await.unwrap_err();
        assert!(matches!(err, DocBroError::VectorDimError { .. }));
    }

    #[tokio::test]
    async fn health_reports_false_when_unreachable() {
        let store = RemoteVectorStore::new("http://127.0.0.1:1".to_string());
        let health = store.health().await;
        assert!(!health.ok);
    }
}
