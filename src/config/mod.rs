pub mod environment;
pub mod poller_config;

pub use environment::Config;
pub use poller_config::{load_poller_config, PollerConfig};
