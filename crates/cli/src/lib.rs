//! Library surface of the `payrep` CLI, kept separate from the binary so
//! integration tests can drive the full generate flow in-process.

pub mod exit_codes;
pub mod generate;
pub mod postprocess;

/// A CLI-level error carrying its exit code and an optional hint line.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, message: impl Into<String>) -> CliError {
        CliError { code, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> CliError {
        self.hint = Some(hint.into());
        self
    }
}
