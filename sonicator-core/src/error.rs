use core::time::Duration;

use thiserror::Error;

use crate::{fault::FaultMask, state::UnitState};

/// Reasons the per-unit state machine rejects a command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandError {
    /// Start is only accepted while idle with no active fault.
    #[error("Start rejected in {0} (faults: {1})")]
    StartRejected(UnitState, FaultMask),
    /// Stop is only accepted while starting or running.
    #[error("Stop rejected in {0}")]
    StopRejected(UnitState),
    /// Overload reset is only accepted in the fault state.
    #[error("Overload reset rejected in {0}")]
    ResetRejected(UnitState),
}

/// Raised when a tuning value is outside its permitted range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Sampling window is out of range.
    #[error("Sampling window ({0:?}) is out of range ([{1:?}, {2:?}])")]
    WindowOutOfRange(Duration, Duration, Duration),
    /// Noise filter threshold is out of range.
    #[error("Noise filter ({0}) is out of range ([{1}, {2}])")]
    NoiseFilterOutOfRange(u32, u32, u32),
    /// More units were configured than the coordinator supports.
    #[error("Number of units ({0}) is out of range ([1, {1}])")]
    TooManyUnits(usize, usize),
    /// A unit refers to a capture channel the counter does not provide.
    #[error("Capture channel ({0}) is out of range ([0, {1}))")]
    CaptureChannelOutOfRange(usize, usize),
}

/// Raised by frequency counter queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CounterError {
    /// The capture channel does not exist.
    #[error("Capture channel ({0}) does not exist")]
    InvalidChannel(usize),
    /// No edges have been captured for longer than the no-signal timeout.
    #[error("No signal for {0:?}")]
    NoSignal(Duration),
}
