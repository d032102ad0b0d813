mod app;
mod choice;
mod cli;
mod commands;
mod config;
mod deck;
mod logging;
mod nav;
mod render;
mod state;
mod theme;
mod view;

use clap::Parser;
use colored::Colorize;

fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    logging::init(logging::level_for(cli.verbose, cli.quiet));
    log::info!("qadeck {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = cli.run() {
        log::error!("{e:#}");
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
