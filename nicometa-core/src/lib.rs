// nicometa core
//
// Process-wide concerns shared by the API and the binary:
// - config: layered file + environment configuration
// - bootstrap: config discovery and validation at startup
// - logging: tracing subscriber initialization

pub mod bootstrap;
pub mod config;
pub mod logging;

pub use config::Config;
