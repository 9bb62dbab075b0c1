use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use offline_event_stats::cli::{Cli, Commands};
use offline_event_stats::config::{StaticConfig, update_config};
use offline_event_stats::runtime::modes::run_server;
use offline_event_stats::system::logging::init_logging;

fn generate_config(path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
            println!("{} {}", "Sample configuration written to".green(), path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { path }) = &cli.command {
        return generate_config(path.as_deref());
    }

    let config = StaticConfig::try_load(cli.config.as_deref()).map_err(|e| {
        eprintln!("{}", e.format_colored());
        anyhow::anyhow!(e.format_simple())
    })?;
    let logging = config.logging.clone();
    update_config(config);

    // guard 必须存活到进程退出，否则非阻塞日志会丢失
    let _log_guard = init_logging(&logging).context("Failed to initialize logging")?;

    run_server().await
}
