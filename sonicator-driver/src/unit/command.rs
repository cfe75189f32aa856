use sonicator_core::common::{Amplitude, Instant};

/// One tick's worth of external control for a unit, as delivered by the
/// register bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitCommand {
    /// Desired run level from the start/stop register.
    pub run: bool,
    /// Amplitude setpoint, already clamped.
    pub amplitude: Amplitude,
    /// The amplitude register changed since the previous intake. The shared
    /// setpoint follows the most recent change.
    pub amplitude_changed: bool,
    /// An overload reset request was consumed from the register map.
    pub reset_overload: bool,
    /// Instant of the most recent validated external register write.
    pub last_external_write: Option<Instant>,
}

/// One-shot requests latched by the command API and consumed by the next tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RequestFlags {
    pub start: bool,
    pub stop: bool,
}

impl RequestFlags {
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
