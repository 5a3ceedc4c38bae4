//! Byte storage for information buffers, with built-in support for proper alignment,
//! power-of-two size rounding and per-thread buffer accounting.

pub mod accounting;
pub mod align;
pub mod buffer;

pub use buffer::AlignedByteVec;
