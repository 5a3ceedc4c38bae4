//! The capability interface a concrete resource type implements to take part in
//! typed information queries.

use std::fmt::Debug;

use ntinfo_common::NtStatus;

use crate::class::InfoClass;

/// Default ceiling for brute-force buffer probing: 16 KiB.
pub const DEFAULT_MAX_BRUTE_FORCE_LENGTH: usize = 16 * 1024;

/// The outcome of a single query attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStatus {
    pub status: NtStatus,
    /// Buffer length the resource reported as required, or `0` when it did not
    /// report one (or the report is not reliable).
    pub reported_length: usize,
}

impl QueryStatus {
    pub const fn new(status: NtStatus, reported_length: usize) -> QueryStatus {
        QueryStatus {
            status,
            reported_length,
        }
    }

    pub const fn success(reported_length: usize) -> QueryStatus {
        QueryStatus::new(NtStatus::SUCCESS, reported_length)
    }

    /// A failure without a length hint.
    pub const fn failure(status: NtStatus) -> QueryStatus {
        QueryStatus::new(status, 0)
    }

    pub const fn unsupported() -> QueryStatus {
        QueryStatus::failure(NtStatus::NOT_SUPPORTED)
    }
}

/// A system resource whose metadata can be queried and set by information class.
///
/// The resource owns (or borrows) the underlying handle; the accessor only borrows the
/// resource for the duration of a call. The primitives must be reentrant for the
/// resource to be used from several threads at once.
pub trait InfoResource {
    /// The information classes this resource type understands.
    type Class: InfoClass;

    /// The access-rights mask the handle was opened with.
    type Rights: Copy + Debug;

    /// Rights granted to the underlying handle. Reported in diagnostics only; access
    /// checks are left to the system call.
    fn granted_access(&self) -> Self::Rights;

    /// Fills `buffer` with the information identified by `class`.
    ///
    /// Must report a size-failure status when, and only when, `buffer` is too small,
    /// and a nonzero `reported_length` whenever the required size is known.
    fn query_information(&self, class: Self::Class, buffer: &mut [u8]) -> QueryStatus {
        let _ = (class, buffer);
        QueryStatus::unsupported()
    }

    /// Applies the serialized value in `buffer` to the information identified by `class`.
    fn set_information(&self, class: Self::Class, buffer: &[u8]) -> NtStatus {
        let _ = (class, buffer);
        NtStatus::NOT_SUPPORTED
    }

    /// Largest buffer brute-force probing may try for this resource type.
    /// `0` disables probing.
    fn max_brute_force_length(&self) -> usize {
        DEFAULT_MAX_BRUTE_FORCE_LENGTH
    }
}
