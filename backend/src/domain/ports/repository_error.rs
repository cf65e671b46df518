//! Error type shared by every persistence port.

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by persistence adapters.
    pub enum RepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "repository connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => {
                Self::service_unavailable(format!("storage unavailable: {message}"))
            }
            RepositoryError::Query { message } => {
                Self::internal(format!("storage error: {message}"))
            }
        }
    }
}

/// Result of a guarded delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Other records still reference the row.
    InUse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RepositoryError::query("syntax"), ErrorCode::InternalError)]
    fn maps_to_domain_codes(#[case] error: RepositoryError, #[case] code: ErrorCode) {
        assert_eq!(Error::from(error).code(), code);
    }
}
