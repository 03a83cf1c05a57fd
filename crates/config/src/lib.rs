//! Configuration loading for the scribe client.
//!
//! Uses figment to layer defaults, an optional YAML file, and `SCRIBE_*`
//! environment variables.

pub mod schema;

pub use schema::{Config, LogConfig, LogFormat};
