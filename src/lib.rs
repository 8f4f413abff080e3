pub mod config;
pub mod modules;
pub mod services;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::{Config, PollerConfig};
use modules::metrics::metrics_routes;
use modules::runs::run_routes;
use services::events::EventBus;
use services::graphql::HttpGraphqlClient;
use services::metrics::MetricsRegistry;
use services::monitor::RelevantRunSpecsMonitor;
use services::project::StaticProjectResolver;

/// Everything the binary needs to poll the cloud and serve status.
pub struct AppState {
    pub monitor: Arc<RelevantRunSpecsMonitor>,
    pub client: Arc<HttpGraphqlClient>,
    pub resolver: Arc<StaticProjectResolver>,
    pub events: EventBus,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn build(
        config: &Config,
        poller_config: &PollerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        poller_config.validate()?;

        let metrics = MetricsRegistry::new()?;
        let client = Arc::new(
            HttpGraphqlClient::new(config.cloud_api_url.clone(), poller_config.request_timeout())
                .with_token(config.cloud_api_token.clone())
                .with_cache_capacity(poller_config.response_cache_capacity),
        );
        let resolver = Arc::new(StaticProjectResolver::new(config.project_slug.clone()));
        let events = EventBus::new(poller_config.event_bus_capacity);

        let monitor = RelevantRunSpecsMonitor::new(
            client.clone(),
            client.clone(),
            resolver.clone(),
            Arc::new(events.clone()),
            poller_config,
        )
        .with_metrics(metrics.clone());

        Ok(Self {
            monitor: Arc::new(monitor),
            client,
            resolver,
            events,
            metrics,
        })
    }
}

pub fn create_app(monitor: Arc<RelevantRunSpecsMonitor>, metrics: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/", axum::routing::get(root))
        .merge(metrics_routes(metrics))
        .nest("/runs", run_routes(monitor))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "Relevant Run Specs Monitor"
}
