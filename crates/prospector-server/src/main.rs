//! Prospector: search-query synthesis server for contact discovery.

use std::sync::Arc;

use prospector_core::ProspectorConfig;
use prospector_llm::{LLMConfig, LlmTextGenerator, TextGenerator};
use prospector_runtime::Orchestrator;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn print_help() {
    println!("Prospector: search-query synthesis server");
    println!();
    println!("Usage: prospector [command]");
    println!();
    println!("Commands:");
    println!("  (none)    Start the server");
    println!("  help      Show this help message");
    println!();
    println!("Environment:");
    println!("  PORT                                HTTP port (default 8000)");
    println!("  SERP_API_KEY                        Market-context search provider");
    println!("  OPENAI_API_KEY / ANTHROPIC_API_KEY / GROQ_API_KEY");
    println!("  PROSPECTOR_LLM_PROVIDER             auto | openai | anthropic | groq");
    println!("  PROSPECTOR_PROVIDER_TIMEOUT_SECS    External call timeout (default 20)");
    println!("  PROSPECTOR_CACHE_TTL_SECS           Context cache TTL");
    println!("  PROSPECTOR_CACHE_MAX_ENTRIES        Context cache capacity");
    println!("  PROSPECTOR_MAX_TOP_K                Upper bound for top_k");
    println!("  PROSPECTOR_PROMPT_TEMPLATE          Prompt template file");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'prospector help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = ProspectorConfig::from_env();
    let llm_config = LLMConfig::from_env();
    let port = config.port;

    let model: Option<Arc<dyn TextGenerator>> = match LlmTextGenerator::from_config(&llm_config) {
        Some(generator) => {
            info!(
                "Text generation via {} ({})",
                generator.provider(),
                generator.model()
            );
            Some(Arc::new(generator))
        }
        None => {
            warn!("No LLM API key configured, using template generation only");
            None
        }
    };
    let search = prospector_context::create_search_provider(config.serp_api_key.as_deref());

    let orchestrator = Orchestrator::from_config(&config, search, model)
        .map_err(|e| anyhow::anyhow!("Failed to initialize pipeline: {}", e))?;

    let state = Arc::new(AppState::new(config, orchestrator));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Prospector server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
