use app_config::{AppConfig, CLAP_ARGS};
use backbeat_discord_bot::logging::setup_logging_config;
use backbeat_discord_bot::processes::run_bot;
use std::sync::Arc;

#[tokio::main]
async fn main() {
  if let Err(error) = setup_logging_config(CLAP_ARGS.log_level(), &CLAP_ARGS.log_dir()) {
    eprintln!("Failed to set up logging. Reason: {}", error);

    return;
  }

  let config = match AppConfig::load(CLAP_ARGS.config_path()) {
    Ok(config) => config,
    Err(error) => {
      tracing::error!("{}", error);
      tracing::error!("Could not load config file. Exiting.");

      return;
    }
  };

  if let Err(error) = run_bot(Arc::new(config)).await {
    tracing::error!("The bot stopped with an error. Reason: {}", error);
  }

  tracing::info!("=== BackbeatBot Discord Bot Shutdown Complete ===");
}
