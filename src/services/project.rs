use async_trait::async_trait;
use tokio::sync::RwLock;

/// Resolves the cloud project slug for the local workspace, if any.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn project_slug(&self) -> Option<String>;
}

/// Resolver backed by a value from configuration. The slug can be swapped
/// at runtime when the workspace is linked or unlinked.
#[derive(Debug, Default)]
pub struct StaticProjectResolver {
    slug: RwLock<Option<String>>,
}

impl StaticProjectResolver {
    pub fn new(slug: Option<String>) -> Self {
        Self {
            slug: RwLock::new(slug.filter(|s| !s.trim().is_empty())),
        }
    }

    pub async fn set_slug(&self, slug: Option<String>) {
        *self.slug.write().await = slug.filter(|s| !s.trim().is_empty());
    }
}

#[async_trait]
impl ProjectResolver for StaticProjectResolver {
    async fn project_slug(&self) -> Option<String> {
        self.slug.read().await.clone()
    }
}
