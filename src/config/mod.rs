#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::modules::ModuleRegistry;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use std::time::Duration;
use toml_config::TomlConfig;
use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://services.leadconnectorhq.com/";
pub const DEFAULT_VERSION: &str = "2021-07-28";

/// 啟動時解析完成、之後不再變動的設定
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub base_url: Url,
    pub default_version: String,
    pub timeout_seconds: Option<u64>,
    pub verbose: bool,
    pub json_logs: bool,
    pub modules: ModuleRegistry,
}

impl RelayConfig {
    /// 依優先順序合併：覆寫值 > 設定檔 > 內建預設值
    pub fn resolve(file: &TomlConfig, overrides: &TomlConfig) -> Result<Self> {
        let base_url_str = overrides
            .upstream
            .base_url
            .as_deref()
            .or(file.upstream.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        validate_url("upstream.base_url", base_url_str)?;
        let base_url = normalize_base_url(base_url_str)?;

        let config = Self {
            host: overrides
                .server
                .host
                .clone()
                .or_else(|| file.server.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides
                .server
                .port
                .or(file.server.port)
                .unwrap_or(DEFAULT_PORT),
            base_url,
            default_version: overrides
                .upstream
                .default_version
                .clone()
                .or_else(|| file.upstream.default_version.clone())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            timeout_seconds: overrides
                .upstream
                .timeout_seconds
                .or(file.upstream.timeout_seconds),
            verbose: overrides
                .logging
                .verbose
                .or(file.logging.verbose)
                .unwrap_or(false),
            json_logs: overrides.logging.json.or(file.logging.json).unwrap_or(false),
            modules: ModuleRegistry::builtin(),
        };

        config.validate()?;
        Ok(config)
    }

    /// 只指定上游位址，其餘使用預設值
    pub fn for_upstream(base_url: &str) -> Result<Self> {
        let mut overrides = TomlConfig::default();
        overrides.upstream.base_url = Some(base_url.to_string());
        Self::resolve(&TomlConfig::default(), &overrides)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.host)?;
        validate_url("upstream.base_url", self.base_url.as_str())?;
        validate_non_empty_string("upstream.default_version", &self.default_version)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("upstream.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

/// 確保路徑以 `/` 結尾，模組路徑才能正確接在後面
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| RelayError::InvalidConfigValueError {
        field: "upstream.base_url".to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
