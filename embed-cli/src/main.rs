//! embed CLI: list providers, embed with a named provider, or auto-select one.
//! Credentials and overrides come from env (`.env` is loaded first).

use anyhow::{Context, Result};
use embed_cli::{provider_config, summarize, Cli, Commands};
use embedding::{init_tracing, EnvEmbeddingConfig};
use embedding_router::EmbeddingRouter;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_ordered();
    init_tracing(cli.log_file.as_deref())?;

    let env = EnvEmbeddingConfig::from_env()
        .context("Load embedding config from env (EMBEDDING_TIMEOUT_MS, EMBEDDING_MAX_RETRIES)")?;
    let router = EmbeddingRouter::from_config(&env);

    let outcome = run(&router, &env, cli.command).await;
    router.release().await;
    outcome
}

async fn run(router: &EmbeddingRouter, env: &EnvEmbeddingConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Providers => {
            for id in router.list_supported_providers() {
                println!("{id}");
            }
        }
        Commands::Embed {
            provider,
            model,
            inputs,
        } => {
            let config = provider_config(env, provider, model);
            let request = inputs.into_request()?;
            info!(provider = %provider, count = request.len(), "step: cli embed");
            let response = router.embed(&config, request).await?;
            println!("{}", serde_json::to_string_pretty(&summarize(&response))?);
        }
        Commands::Auto { inputs } => {
            let request = inputs.into_request()?;
            info!(count = request.len(), "step: cli auto embed");
            let response = router.auto_embed(request).await?;
            println!("{}", serde_json::to_string_pretty(&summarize(&response))?);
        }
    }
    Ok(())
}
