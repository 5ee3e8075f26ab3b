// cinelog - movie review data service

// Canonical record types
pub mod models;

// Movie Data Adapter - provider client and normalization boundary
pub mod provider;

// Document store client and review/profile services
pub mod store;
pub mod reviews;
pub mod aggregate;
pub mod profile;

// Accounts, session state, contact log
pub mod auth;
pub mod contact;

// HTTP surface and wiring
pub mod http;
pub mod app_state;
pub mod config;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
