use anyhow::Context;
use clap::Parser;
use crm_relay::utils::logger;
use crm_relay::{server, CliConfig, HttpUpstream, RelayService};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            // 設定無效時日誌尚未依設定初始化，直接使用命令列旗標
            logger::init_logger(cli.verbose, cli.json_logs);
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    logger::init_logger(config.verbose, config.json_logs);
    tracing::debug!("Resolved config: {:?}", config);
    tracing::info!(
        "📋 Allowed modules: {}",
        config.modules.names().collect::<Vec<_>>().join(", ")
    );

    let upstream =
        HttpUpstream::new(config.request_timeout()).context("failed to build upstream client")?;
    let service = RelayService::new(upstream, &config);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    tracing::info!(
        "🚀 Server running on http://{} (upstream: {})",
        address,
        config.base_url
    );

    server::run(listener, server::app(service))
        .await
        .context("server terminated unexpectedly")?;

    tracing::info!("✅ Server stopped");
    Ok(())
}
