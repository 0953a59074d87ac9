//! HTTP API: server wiring, route policy enforcement and request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
