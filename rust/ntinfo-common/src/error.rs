use thiserror::Error;

use crate::status::NtStatus;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// The status equivalent of this error, as it would be reported to a caller that
    /// inspects statuses instead of errors.
    pub fn status(&self) -> NtStatus {
        match self.kind() {
            ErrorKind::InvalidArgument { .. } => NtStatus::INVALID_PARAMETER,
            ErrorKind::Unsupported { status, .. } => *status,
            ErrorKind::Status { status, .. } => *status,
            ErrorKind::GrowthExhausted { .. } => NtStatus::BUFFER_TOO_SMALL,
            ErrorKind::PayloadTooSmall { .. } => NtStatus::BUFFER_TOO_SMALL,
        }
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Converts a failing status into an error.
    ///
    /// `NOT_SUPPORTED` and `NOT_IMPLEMENTED` are classified as [`ErrorKind::Unsupported`],
    /// everything else as a terminal [`ErrorKind::Status`] failure.
    pub fn from_status(context: impl Into<String>, status: NtStatus) -> Error {
        debug_assert!(status.is_failure());
        let context = context.into();
        let kind = if status.is_unsupported() {
            ErrorKind::Unsupported { context, status }
        } else {
            ErrorKind::Status { context, status }
        };
        Error(kind.into())
    }

    pub fn growth_exhausted(context: impl Into<String>, ceiling: usize) -> Error {
        Error(
            ErrorKind::GrowthExhausted {
                context: context.into(),
                ceiling,
            }
            .into(),
        )
    }

    pub fn payload_too_small(required: usize, actual: usize) -> Error {
        Error(ErrorKind::PayloadTooSmall { required, actual }.into())
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("information class not supported: {context} ({status})")]
    Unsupported { context: String, status: NtStatus },

    #[error("{context} failed: {status}")]
    Status { context: String, status: NtStatus },

    #[error("{context}: buffer too small after probing up to {ceiling} bytes")]
    GrowthExhausted { context: String, ceiling: usize },

    #[error("payload requires {required} bytes, buffer holds {actual}")]
    PayloadTooSmall { required: usize, actual: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
