//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Client { .. } => exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::Domain(DomainError::InvalidEpisodeIndex { .. }) => {
                        exitcode::USAGE
                    }
                    ApplicationError::Domain(_) => exitcode::DATAERR,
                    ApplicationError::OperationFailed { .. } if app.is_remote() => {
                        exitcode::UNAVAILABLE
                    }
                    ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::HubResultExt;
    use crate::infrastructure::{HubError, HubResult};

    #[test]
    fn given_hub_failure_when_exit_code_then_unavailable() {
        let res: HubResult<()> = Err(HubError::Rejected("nope".into()));
        let err: CliError = res.context(|| "create tag".into()).unwrap_err().into();
        assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
        assert_eq!(err.to_string(), "create tag: nope");
    }

    #[test]
    fn given_schema_mismatch_when_exit_code_then_dataerr() {
        let err: CliError = DomainError::SchemaMismatch("x".into()).into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_usage_error_when_exit_code_then_one() {
        assert_eq!(CliError::Usage("no".into()).exit_code(), 1);
    }
}
