//! Typed query and set of variable-length information on system resources.
//!
//! A resource type implements [`InfoResource`], supplying the raw query and set
//! primitives for its information classes. Every such resource then gets the typed
//! entry points of [`InfoAccess`]:
//!
//! - [`InfoAccess::query_fixed`] for payloads of fixed, statically known size;
//! - [`InfoAccess::query_variable`] for payloads whose size is only known to the
//!   system, discovered adaptively (see [`growth`]);
//! - [`InfoAccess::set`] to apply a value.
//!
//! Each entry point takes an [`ErrorMode`] that decides whether a failing status is
//! raised as an error or reported as [`Outcome::Failure`].

pub mod access;
pub mod buffer;
pub mod class;
pub mod growth;
pub mod mode;
pub mod resource;

#[cfg(all(windows, target_pointer_width = "64"))]
pub mod windows;

pub use access::InfoAccess;
pub use buffer::{InfoBuffer, ScopedBuffer};
pub use class::InfoClass;
pub use growth::GrowthPolicy;
pub use mode::{ErrorMode, Outcome};
pub use ntinfo_common::{NtStatus, Result, error::Error, error::ErrorKind};
pub use resource::{DEFAULT_MAX_BRUTE_FORCE_LENGTH, InfoResource, QueryStatus};
