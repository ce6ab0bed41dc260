mod cli;
mod commands;
mod compose;
mod config;
mod resource;
mod template;
mod ui;
mod versions;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

use crate::config::Overrides;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
    pub overrides: Overrides,
}

fn main() {
    if let Err(err) = run() {
        ui::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: cli.config,
        overrides: cli.overrides.into(),
    };

    match cli.command {
        Command::Synth(args) => commands::synth::run(&ctx, &args.out),
        Command::Show(args) => commands::show::run(&ctx, args.assume_azs),
        Command::Diff(args) => commands::diff::run(&ctx, &args.out),
        Command::Versions => commands::versions::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "craftstack", &mut io::stdout());
            Ok(())
        }
    }
}
