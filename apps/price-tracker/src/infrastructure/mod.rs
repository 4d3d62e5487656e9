//! Infrastructure layer - Adapters and external integrations.

/// Configuration loading.
pub mod config;

/// HTTP API server.
pub mod http;

/// Market data API client.
pub mod marketdata;

/// Price store implementations.
pub mod persistence;
