use bale_report::config::{Config, DEFAULT_CONFIG_PATH, LlmBackend};
use bale_report::llm_extract::{self, ChatCompletionClient};
use bale_report::web::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("BALE_REPORT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_or_default(&config_path)?;

    let endpoint = llm_extract::resolve_endpoint(&cfg.llm);
    let client = reqwest::Client::new();

    // Health check for local backends
    if cfg.llm.backend == LlmBackend::Ollama
        && !llm_extract::check_ollama_health(&client, &endpoint.base_url).await
    {
        warn!(url = %endpoint.base_url, "Ollama is not running. Start it with: ollama serve");
    }

    tokio::fs::create_dir_all(&cfg.server.static_dir).await?;
    let state = AppState::new(
        Arc::new(ChatCompletionClient::new(client, endpoint)),
        cfg.server.static_dir.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    info!(
        bind = %cfg.server.bind,
        static_dir = %cfg.server.static_dir.display(),
        "Listening"
    );

    axum::serve(listener, web::build_router(state)).await?;

    Ok(())
}
