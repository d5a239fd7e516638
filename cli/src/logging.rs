use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

/// Routes `log` records to stderr so stdout carries only command output.
///
/// # Errors
///
/// An error is returned if a logger has already been set.
pub(crate) fn setup_logging(
    max_level: impl Into<LevelFilter>,
) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        max_level.into(),
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}
