//! Atelier Kernel Library
//!
//! Editable-content upsert and sanitization service for small sites.
//! The main entry point for running the server is the `atelier` binary;
//! the library is exposed for integration testing.

pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
