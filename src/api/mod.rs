//! API routes module.

pub mod proxy;
pub mod routes;

pub use routes::create_router;
