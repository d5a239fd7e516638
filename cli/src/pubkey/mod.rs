pub(crate) mod encode;
pub(crate) mod inspect;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum PubkeyCommands {
    /// Print the fields of a PEM public key
    Inspect {
        #[command(flatten)]
        config: inspect::Config,
    },
    /// Wrap raw public key bytes as SubjectPublicKeyInfo DER/PEM
    Encode {
        #[command(flatten)]
        config: encode::Config,
    },
}
