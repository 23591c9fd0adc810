//! Shared ambient stack for expense services
//!
//! - [`logging`]: tracing subscriber setup (console + daily rolling file)
//! - [`config`]: layered figment configuration loading
//! - [`error`]: common error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::{load_config, load_config_from_dir, load_config_from_file};
pub use error::{Error, Result};
pub use logging::{init_logging, init_test_logging, LogConfig, LogConfigBuilder, LogFormat};
