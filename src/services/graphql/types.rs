use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an executor may use its local response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Serve from cache when possible, otherwise hit the network.
    CacheFirst,
    /// Always hit the network. The result is still written to the cache.
    NetworkOnly,
}

/// Identifies a cached root field: `Query.cloudProjectBySlug({"slug": ..})`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub typename: String,
    pub field: String,
    pub args: Value,
}

impl CacheKey {
    pub fn new(typename: &str, field: &str, args: Value) -> Self {
        Self {
            typename: typename.to_string(),
            field: field.to_string(),
            args,
        }
    }

    pub fn project_by_slug(slug: &str) -> Self {
        Self::new("Query", "cloudProjectBySlug", serde_json::json!({ "slug": slug }))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}({})", self.typename, self.field, self.args)
    }
}

/// A single GraphQL operation to run against the cloud.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: Value,
    pub policy: CachePolicy,
    /// Root fields the response covers, used to drop it on invalidation.
    pub cache_keys: Vec<CacheKey>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    Http(u16),
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl QueryError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout => "timeout",
            Self::Http(_) => "http",
            Self::GraphQl(_) => "graphql",
            Self::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Executes GraphQL operations and returns the response `data`.
#[async_trait]
pub trait RemoteQueryExecutor: Send + Sync {
    async fn execute(&self, request: QueryRequest) -> Result<Value, QueryError>;
}

/// Drops cached responses for a root field.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, key: CacheKey) -> Result<(), QueryError>;
}
