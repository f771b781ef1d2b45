//! Configuration loading
//!
//! `TASKFLOW_*` environment variables take precedence over a probed
//! `taskflow.{json,toml}` file; built-in defaults apply when neither exists.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
