use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use testscribe::app::App;
use testscribe::cli::Cli;

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env("TESTSCRIBE_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            let mut app = App::new().await?;
            init_tracing(&app.config.logging.level)?;
            app.run_command(cmd).await?;
        }
        None => {
            // Default to showing help when no command is specified
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_tracing_init_reports_error() {
        let _ = init_tracing("info");
        assert!(init_tracing("debug").is_err());
    }
}
