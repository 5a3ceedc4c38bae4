//! Test utilities for the ntinfo crates.
//!
//! This crate provides in-memory resources whose query and set primitives follow a
//! script, recording every attempt so that tests can check buffer sizes and call counts.

pub mod payloads;
pub mod scripted;

pub use scripted::{Attempt, LengthReport, ScriptedResource, TestClass, TestRights};
