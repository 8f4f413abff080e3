use relevant_run_specs::config::{load_poller_config, Config, PollerConfig};
use relevant_run_specs::services::monitor::AdaptivePoller;
use relevant_run_specs::AppState;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relevant_run_specs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let poller_config = match &config.poller_config_path {
        Some(path) => load_poller_config(path)?,
        None => PollerConfig::default(),
    };
    tracing::info!("Polling {} every {}s", config.cloud_api_url, poller_config.initial_interval_secs);

    let state = AppState::build(&config, &poller_config)?;

    // Log every notification the monitor publishes
    let mut events = state.events.subscribe();
    let monitor = state.monitor.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => {
                    let snapshot = monitor.cached().await;
                    tracing::info!(
                        "[{}] {} statuses={:?} specs={:?}",
                        envelope.time,
                        envelope.event.as_str(),
                        snapshot.statuses,
                        snapshot.run_specs
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event logger lagged, skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let poller = Arc::new(AdaptivePoller::new(state.monitor.clone()));
    let handle = poller.start(config.identifiers()).await;
    tracing::info!(
        "Tracking runs {:?} (initial snapshot empty: {})",
        config.identifiers(),
        handle.initial_value.is_empty()
    );

    let app = relevant_run_specs::create_app(state.monitor.clone(), state.metrics.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    poller.shutdown().await;
    Ok(())
}
