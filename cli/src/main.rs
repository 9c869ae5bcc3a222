mod app;
mod cli;
mod config;
mod effects;
mod render;

use clap::Parser;

use common::logger::{LogFormat, init_logger};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    let format = if is_production {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logger("lucky-draw", "warn", format);

    let mut cfg = AppConfig::from_env();
    cfg.apply(&cli.overrides);

    tracing::info!(store = ?cfg.store, digits = cfg.draw.digit_count, "starting lucky draw");

    let command = cli.command.unwrap_or(Command::Run);
    if let Command::Import { path } = &command {
        return app::import(&cfg, path).await;
    }

    let store = app::build_store(&cfg).await?;

    match command {
        Command::Run => app::run(&cfg, store).await,
        Command::Pool => app::list_pool(&cfg, store).await,
        Command::Results => app::list_results(&cfg, store).await,
        Command::Reset { yes } => app::reset(&cfg, store, yes).await,
        Command::Import { .. } => Ok(()),
    }
}
