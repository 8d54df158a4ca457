use anyhow::Context;
use clap::Parser;
use llm_relay::cli::Cli;
use llm_relay::llm::CompletionClient;
use llm_relay::{logging, transport, ModelRegistry, Relay, ServerInfo};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.loader().build()?;

    let _guard = logging::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = if config.server.stdio { "stdio" } else { "http" },
        "Server starting up"
    );

    let llm_config = config.openai.to_llm_config();
    if llm_config.get_api_key().is_none() {
        error!("OPENAI_API_KEY environment variable not set");
        anyhow::bail!("OPENAI_API_KEY environment variable not set");
    }

    let client =
        CompletionClient::from_config(&llm_config).context("Failed to initialize OpenAI client")?;
    info!(provider = client.provider_name(), "Completion client initialized");

    // Streaming is only reachable over HTTP
    let registry = ModelRegistry::with_streaming(!config.server.stdio);
    let relay = Relay::new(registry, client).with_server_info(ServerInfo {
        name: config.server.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    transport::run(&config, relay).await?;

    Ok(())
}
