use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use super::cache::ResponseCache;
use super::types::{
    CacheInvalidator, CacheKey, CachePolicy, QueryError, QueryRequest, RemoteQueryExecutor,
};

/// GraphQL client for the cloud API, with a local response cache.
pub struct HttpGraphqlClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    cache: ResponseCache,
}

impl HttpGraphqlClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url,
            token: None,
            cache: ResponseCache::new(),
        }
    }

    /// Send `token` as a bearer header on every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Bound the response cache to `max_entries`.
    pub fn with_cache_capacity(mut self, max_entries: usize) -> Self {
        self.cache = ResponseCache::with_capacity(max_entries);
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    async fn post(&self, request: &QueryRequest) -> Result<Value, QueryError> {
        let payload = json!({
            "operationName": request.operation_name,
            "query": request.query,
            "variables": request.variables,
        });

        let mut builder = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(
                "{} returned HTTP {} after {:?}",
                request.operation_name,
                status,
                start.elapsed()
            );
            return Err(QueryError::Http(status.as_u16()));
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Parse(e.to_string()))?;

        tracing::debug!("{} completed in {:?}", request.operation_name, start.elapsed());

        if !body.errors.is_empty() {
            return Err(QueryError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        body.data
            .ok_or_else(|| QueryError::Parse("Missing data".to_string()))
    }
}

#[async_trait]
impl RemoteQueryExecutor for HttpGraphqlClient {
    async fn execute(&self, request: QueryRequest) -> Result<Value, QueryError> {
        if request.policy == CachePolicy::CacheFirst {
            if let Some(data) = self.cache.get(&request).await {
                return Ok(data);
            }
        }

        let data = self.post(&request).await?;
        self.cache.store(&request, data.clone()).await;
        Ok(data)
    }
}

#[async_trait]
impl CacheInvalidator for HttpGraphqlClient {
    async fn invalidate(&self, key: CacheKey) -> Result<(), QueryError> {
        let dropped = self.cache.invalidate(&key).await;
        tracing::debug!("Invalidated {} cached response(s) for {}", dropped, key);
        Ok(())
    }
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorObj>,
}

#[derive(Deserialize)]
struct GraphqlErrorObj {
    message: String,
}
