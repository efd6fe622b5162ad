use crate::config::toml_config::TomlConfig;
use crate::config::RelayConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "crm-relay")]
#[command(about = "Relays GET requests to a CRM REST API and reshapes the response")]
pub struct CliConfig {
    #[arg(long, help = "Address to bind (default 0.0.0.0)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (default 3000)")]
    pub port: Option<u16>,

    #[arg(long, help = "Upstream API base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Version header sent when the caller omits it")]
    pub default_version: Option<String>,

    #[arg(long, help = "Upstream request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 命令列參數轉成覆寫值，旗標只有在開啟時才覆寫
    pub fn to_overrides(&self) -> TomlConfig {
        let mut overrides = TomlConfig::default();
        overrides.server.host = self.host.clone();
        overrides.server.port = self.port;
        overrides.upstream.base_url = self.base_url.clone();
        overrides.upstream.default_version = self.default_version.clone();
        overrides.upstream.timeout_seconds = self.timeout_seconds;
        overrides.logging.verbose = self.verbose.then_some(true);
        overrides.logging.json = self.json_logs.then_some(true);
        overrides
    }

    pub fn load(&self) -> Result<RelayConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        RelayConfig::resolve(&file, &self.to_overrides())
    }
}
