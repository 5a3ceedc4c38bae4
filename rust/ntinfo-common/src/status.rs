//! `NtStatus`: the status code reported by information query and set primitives.

use std::fmt;

/// A 32-bit NT-style status code.
///
/// The two most significant bits carry the severity. A status is considered successful
/// when the code is non-negative, i.e. for the success and informational severities.
/// Warnings (such as [`NtStatus::BUFFER_OVERFLOW`]) and errors are failures.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NtStatus(i32);

impl NtStatus {
    pub const SUCCESS: NtStatus = NtStatus::from_u32(0x0000_0000);
    pub const BUFFER_OVERFLOW: NtStatus = NtStatus::from_u32(0x8000_0005);
    pub const NOT_IMPLEMENTED: NtStatus = NtStatus::from_u32(0xC000_0002);
    pub const INVALID_INFO_CLASS: NtStatus = NtStatus::from_u32(0xC000_0003);
    pub const INFO_LENGTH_MISMATCH: NtStatus = NtStatus::from_u32(0xC000_0004);
    pub const INVALID_HANDLE: NtStatus = NtStatus::from_u32(0xC000_0008);
    pub const INVALID_PARAMETER: NtStatus = NtStatus::from_u32(0xC000_000D);
    pub const ACCESS_DENIED: NtStatus = NtStatus::from_u32(0xC000_0022);
    pub const BUFFER_TOO_SMALL: NtStatus = NtStatus::from_u32(0xC000_0023);
    pub const NOT_SUPPORTED: NtStatus = NtStatus::from_u32(0xC000_00BB);

    /// Statuses meaning "the buffer might just be too small, retry with a larger one".
    pub const SIZE_FAILURES: [NtStatus; 3] = [
        NtStatus::INFO_LENGTH_MISMATCH,
        NtStatus::BUFFER_TOO_SMALL,
        NtStatus::BUFFER_OVERFLOW,
    ];

    #[inline]
    pub const fn from_raw(code: i32) -> NtStatus {
        NtStatus(code)
    }

    #[inline]
    pub const fn from_u32(code: u32) -> NtStatus {
        NtStatus(code as i32)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub const fn is_failure(self) -> bool {
        !self.is_success()
    }

    /// Returns `true` for the statuses that a larger buffer may resolve:
    /// info length mismatch, buffer too small and buffer overflow.
    #[inline]
    pub fn is_size_failure(self) -> bool {
        Self::SIZE_FAILURES.contains(&self)
    }

    /// Returns `true` when the status says the class is not handled by the resource.
    #[inline]
    pub fn is_unsupported(self) -> bool {
        self == NtStatus::NOT_SUPPORTED || self == NtStatus::NOT_IMPLEMENTED
    }

    pub const fn severity(self) -> Severity {
        match self.as_u32() >> 30 {
            0 => Severity::Success,
            1 => Severity::Informational,
            2 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Symbolic name of the well-known codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            NtStatus::SUCCESS => "STATUS_SUCCESS",
            NtStatus::BUFFER_OVERFLOW => "STATUS_BUFFER_OVERFLOW",
            NtStatus::NOT_IMPLEMENTED => "STATUS_NOT_IMPLEMENTED",
            NtStatus::INVALID_INFO_CLASS => "STATUS_INVALID_INFO_CLASS",
            NtStatus::INFO_LENGTH_MISMATCH => "STATUS_INFO_LENGTH_MISMATCH",
            NtStatus::INVALID_HANDLE => "STATUS_INVALID_HANDLE",
            NtStatus::INVALID_PARAMETER => "STATUS_INVALID_PARAMETER",
            NtStatus::ACCESS_DENIED => "STATUS_ACCESS_DENIED",
            NtStatus::BUFFER_TOO_SMALL => "STATUS_BUFFER_TOO_SMALL",
            NtStatus::NOT_SUPPORTED => "STATUS_NOT_SUPPORTED",
            _ => return None,
        };
        Some(name)
    }
}

impl Default for NtStatus {
    fn default() -> Self {
        NtStatus::SUCCESS
    }
}

impl From<i32> for NtStatus {
    fn from(code: i32) -> Self {
        NtStatus(code)
    }
}

impl From<NtStatus> for i32 {
    fn from(status: NtStatus) -> Self {
        status.0
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({:#010X})", self.as_u32()),
            None => write!(f, "{:#010X}", self.as_u32()),
        }
    }
}

impl fmt::Debug for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Severity encoded in the two most significant bits of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Informational,
    Warning,
    Error,
}
