pub(crate) mod import;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum CertCommands {
    /// Read a certificate and extract its public key (trust is not verified)
    Import {
        #[command(flatten)]
        config: import::Config,
    },
}
