use clap::{Parser, Subcommand};

use self::{config::ConfigArg, replay::ReplayArg};

mod config;
mod replay;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a scripted game and print the final state as JSON
    Replay(#[clap(flatten)] ReplayArg),
    /// Print the default engine configuration, or validate a configuration file
    Config(#[clap(flatten)] ConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Config(arg) => config::run(&arg)?,
    }
    Ok(())
}
