use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    automaton::{self, AutomatonArgs},
    mcmc::{self, McmcArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser, Debug)]
#[command(name = "ksim-sim", about = "K-state automaton and Metropolis-Hastings CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve a K-state cellular automaton and record its spacetime history.
    Automaton(AutomatonArgs),
    /// Estimate e by sampling the posterior with Metropolis-Hastings.
    Mcmc(McmcArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ksim_sim=info,ksim_ca=info,ksim_mcmc=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Automaton(args) => automaton::run(&args),
        Command::Mcmc(args) => mcmc::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
