// Library root. Exposes the modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod api;
pub mod availability;
pub mod cache;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod providers;
pub mod scheduler;
pub mod search_area;

// Only needed by the binary.
pub mod cli;
pub mod config;
pub mod logging;
