use clap::Parser;
use treediff::config::Cli;
use treediff::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so the report on stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    treediff::commands::compare::run(config)?;

    Ok(())
}
