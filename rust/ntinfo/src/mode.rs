//! Call-site choice between raising failures as errors and reporting them as statuses.

use ntinfo_common::{NtStatus, Result, error::Error};

/// How a failing status is surfaced by a query or set entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// A failing status becomes `Err(Error)`.
    #[default]
    Propagate,
    /// A failing status becomes `Ok(Outcome::Failure(status))`, for the caller to inspect.
    Report,
}

impl ErrorMode {
    /// Surfaces `status` according to the mode. `status` must be a failure.
    pub fn fail<T>(self, context: impl FnOnce() -> String, status: NtStatus) -> Result<Outcome<T>> {
        debug_assert!(status.is_failure());
        match self {
            ErrorMode::Propagate => Err(Error::from_status(context(), status)),
            ErrorMode::Report => Ok(Outcome::Failure(status)),
        }
    }

    /// Surfaces an error raised by the accessor itself (such as exhausted growth).
    ///
    /// In `Report` mode the error is folded into its status equivalent.
    pub fn fail_with<T>(self, error: Error) -> Result<Outcome<T>> {
        match self {
            ErrorMode::Propagate => Err(error),
            ErrorMode::Report => Ok(Outcome::Failure(error.status())),
        }
    }
}

/// Result of a query or set in which failures are reported rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(NtStatus),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The failing status, or `SUCCESS`.
    pub fn status(&self) -> NtStatus {
        match self {
            Outcome::Success(_) => NtStatus::SUCCESS,
            Outcome::Failure(status) => *status,
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(status) => Outcome::Failure(*status),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(status) => Outcome::Failure(status),
        }
    }

    /// Raises a reported failure as an error.
    pub fn into_result(self, context: impl Into<String>) -> Result<T> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(status) => Err(Error::from_status(context, status)),
        }
    }
}
