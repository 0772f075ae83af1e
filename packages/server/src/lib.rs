//! Edit-intake HTTP service: accepts copy corrections against rendered
//! pages, records them durably, and applies them to page-module sources
//! either immediately (development) or deferred (production).

pub mod applier;
pub mod config;
pub mod cors;
pub mod error;
pub mod routes;

pub use applier::{DeferredApplier, EditApplier, ImmediateApplier, PageMap};
pub use config::{Config, Environment};
pub use cors::OriginMatcher;
pub use error::ApiError;
pub use routes::{build_router, AppState, SharedState};
