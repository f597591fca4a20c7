use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use docextract::config::Config;
use docextract::extraction::{ExtractionPipeline, PipelineSettings};
use docextract::llm::{LLMProviderConfig, LLM};
use docextract::routes::create_router;
use docextract::utils::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?} {:?}", config.server, config.llm);

    let llm = LLM::new(LLMProviderConfig {
        name: config.llm.provider.clone(),
        api_key: config.llm.openai_api_key.clone(),
        api_base: config.llm.api_base.clone(),
        timeout: Some(config.llm.timeout()),
    })?;
    info!(provider = %llm.provider(), model = %config.llm.model, "LLM client ready");

    let pipeline = ExtractionPipeline::new(llm.adapter(), PipelineSettings::from_config(&config));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = docextract::AppState::new(config, pipeline);
    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
