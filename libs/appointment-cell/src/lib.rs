pub mod filter;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod stats;

pub use models::*;
pub use router::*;
