//! HTTP layer: router, health, static client files

pub mod routes;

pub use routes::build_router;
