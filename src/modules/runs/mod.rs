pub mod controller;
pub mod model;
pub mod routes;
pub mod schema;

pub use model::*;
pub use routes::run_routes;
