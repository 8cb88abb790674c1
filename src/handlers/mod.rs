// Description API HTTP handlers
//
// This module contains the HTTP handlers for the API.
// It provides the interface between HTTP requests and the AI pipelines.

pub mod authentication;
pub mod form;
pub mod routes;

// Re-export handlers for easier access
pub use self::routes::{analyze_audio, authenticate, describe};
// Re-export the allow-list guard
pub use self::authentication::AllowList;
