//! Integration tests exercising registration and dispatch end to end.

pub mod contract;
pub mod encoding;
pub mod http_server;
pub mod malformed_input;
pub mod query;
