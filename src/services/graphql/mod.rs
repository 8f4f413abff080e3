pub mod cache;
pub mod client;
pub mod types;

pub use cache::*;
pub use client::*;
pub use types::*;
