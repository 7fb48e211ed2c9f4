use anyhow::Result;
use clap::Parser;
use growthmap::cli::{Cli, Commands};
use growthmap::commands::{self, AnalyzeConfig};
use growthmap::observability::{init_tracing, install_panic_hook};

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            overrides,
        } => commands::handle_analyze(AnalyzeConfig {
            path,
            format,
            output,
            overrides,
        }),
        Commands::Init { force } => commands::init_config(force),
    }
}
