use derive_more::Display;

/// Operating state of a single sonicator unit.
#[derive(Default, Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnitState {
    /// Output off, ready to accept a start command.
    #[default]
    Idle = 0,
    /// Start accepted, output asserted, waiting out the start delay.
    Starting = 1,
    /// Output asserted and the start delay has elapsed.
    Running = 2,
    /// Stop accepted, output released, waiting out the stop delay.
    Stopping = 3,
    /// One or more fault conditions are active and the output is held off.
    Fault = 4,
}

impl UnitState {
    /// Returns `true` while the hardware start line is asserted.
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        matches!(self, UnitState::Starting | UnitState::Running)
    }

    /// Returns `true` in the fault state.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, UnitState::Fault)
    }
}
