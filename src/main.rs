mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use commands::submit::SubmitArgs;
use commands::{handle_collect_command, handle_submit_command};
use output::print_error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Collect {
            format,
            node_context,
        } => handle_collect_command(&format, node_context.as_deref()),
        Commands::Submit {
            config,
            endpoint,
            api_token,
            node_context,
        } => handle_submit_command(SubmitArgs {
            config,
            endpoint,
            api_token,
            node_context,
        }),
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
