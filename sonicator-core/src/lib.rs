#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for the multi-sonicator controller.

/// Unit-bearing value types shared across the workspace.
pub mod common;
/// Constants describing the driven sonicator hardware.
pub mod devices;
/// Errors returned by command, configuration, and counter operations.
pub mod error;
/// Fault conditions raised by the per-unit monitor.
pub mod fault;
/// Hardware capability ports.
pub mod hal;
/// The semantic register map and its access port.
pub mod registers;
/// Operating states of a sonicator unit.
pub mod state;
