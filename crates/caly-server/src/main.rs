use caly_server::logging::init_logging;
use caly_server::{run_server, AppState, Cli, ServerConfig};
use clap::Parser;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already carry the settings.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_level.as_deref());

    if let Ok(path) = dotenv {
        log::info!("Loaded environment from {}", path.display());
    }
    if cli.debug {
        log::debug!("Debug mode enabled");
    }

    let config = ServerConfig::from(cli);
    log::info!("Model: {} via {}", config.gemini.model, config.gemini.base_url);

    let state = AppState::from_config(&config)?;
    run_server(&config, state).await?;

    Ok(())
}
