// Library root. The binary entry point is src/main.rs; integration tests
// drive the router through this crate.

pub mod answer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod logger;
