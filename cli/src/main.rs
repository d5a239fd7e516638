use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use log::error;

mod cert;
mod error;
mod keychain;
mod logging;
mod output;
mod pubkey;
mod utils;

use error::Result;

use cert::CertCommands;
use keychain::KeychainCommands;
use pubkey::PubkeyCommands;

#[derive(Parser)]
#[command(name = "keywrap")]
#[command(
    about = "Wrap raw public keys as DER/PEM and read public keys from certificates",
    long_about = None
)]
struct Cli {
    /// Global processing log verbosity.
    #[command(flatten)]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Public key operations
    Pubkey {
        #[command(subcommand)]
        command: PubkeyCommands,
    },
    /// Key store operations
    Keychain {
        #[command(subcommand)]
        command: KeychainCommands,
    },
    /// Certificate operations
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Pubkey { command } => match command {
            PubkeyCommands::Inspect { config } => pubkey::inspect::execute(config),
            PubkeyCommands::Encode { config } => pubkey::encode::execute(config),
        },
        Commands::Keychain { command } => match command {
            KeychainCommands::Export { config } => keychain::export::execute(config),
            KeychainCommands::Delete { config } => keychain::delete::execute(config),
        },
        Commands::Cert { command } => match command {
            CertCommands::Import { config } => cert::import::execute(config),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::setup_logging(cli.verbosity) {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    if let Err(error) = run(cli.command) {
        error!("{error}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
