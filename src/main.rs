//! `tg-pipegen` entry point: parse arguments, run, report errors.

use clap::Parser;
use terragrunt_pipegen::cli::Cli;
use terragrunt_pipegen::core::error::display_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(err) = cli.execute().await {
        display_error(&err);
        std::process::exit(1);
    }
}
