//! Core definitions (status codes, errors and result helpers), relied upon by all ntinfo-* crates.

pub mod error;
pub mod result;
pub mod status;

pub use result::Result;
pub use status::NtStatus;
