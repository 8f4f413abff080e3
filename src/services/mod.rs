pub mod events;
pub mod graphql;
pub mod metrics;
pub mod monitor;
pub mod project;
