pub mod apis;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod names;
pub mod parser;
pub mod pipeline;
pub mod snapshot;
pub mod types;

// Port/adapter split for page fetching
pub mod app;
pub mod infra;
