use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("daf error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(&flags)?;

    match &cli.command {
        cli::Commands::Parse(args) => return commands::parse::handle(args, &flags),
        cli::Commands::Merge(args) => return commands::merge::handle(args, &flags),
        _ => {}
    }

    let loaded = bootstrap::load()?;
    match cli.command {
        cli::Commands::Page(args) => commands::page::handle(&args, loaded, &flags).await,
        cli::Commands::Expand(args) => commands::expand::handle(&args, &loaded, &flags),
        cli::Commands::Parse(_) | cli::Commands::Merge(_) => {
            unreachable!("parse/merge are pre-dispatched")
        }
    }
}

const fn log_level(flags: &cli::GlobalFlags) -> &'static str {
    if flags.quiet {
        "error"
    } else if flags.verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_tracing(flags: &cli::GlobalFlags) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DAF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(flags)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli::{GlobalFlags, OutputFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn log_level_follows_global_flags() {
        let flags = |quiet, verbose| GlobalFlags { format: OutputFormat::Json, quiet, verbose };
        assert_eq!(log_level(&flags(false, false)), "warn");
        assert_eq!(log_level(&flags(false, true)), "debug");
        assert_eq!(log_level(&flags(true, true)), "error");
    }
}
