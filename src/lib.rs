pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use app::server;
pub use config::RelayConfig;
pub use core::{modules::ModuleRegistry, relay::RelayService, upstream::HttpUpstream};
pub use utils::error::{RelayError, Result};
