pub(crate) mod delete;
pub(crate) mod export;
mod storage;

use clap::Subcommand;

use crate::error::{Error, Result};

pub(crate) use storage::DirectoryStorage;

#[derive(Subcommand)]
pub(crate) enum KeychainCommands {
    /// Export the public key stored under a tag, generating the pair if absent
    Export {
        #[command(flatten)]
        config: export::Config,
    },
    /// Delete the key pair stored under a tag
    Delete {
        #[command(flatten)]
        config: delete::Config,
    },
}

/// Tags become file names, so they must not address other directories.
fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() || tag.contains(['/', '\\']) || tag == "." || tag == ".." {
        return Err(Error::InvalidInput(format!("invalid tag '{}'", tag)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(tag, valid,
        case("com.example.keys", true),
        case("app", true),
        case("", false),
        case("..", false),
        case("../app", false),
        case("dir\\app", false),
    )]
    fn test_validate_tag(tag: &str, valid: bool) {
        assert_eq!(valid, validate_tag(tag).is_ok());
    }
}
