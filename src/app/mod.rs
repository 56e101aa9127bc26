//! Shared application state

pub mod sessions;
pub mod state;

pub use state::AppState;
