//! Observability setup shared by the CLI and the HTTP server.

pub mod tracing_setup;
