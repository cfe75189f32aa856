use core::time::Duration;

use getset::CopyGetters;

use sonicator_core::{
    common::{Amplitude, Freq, Instant},
    devices::Ct2000,
    fault::FaultMask,
    registers::StatusFlags,
    state::UnitState,
};

use crate::params;

/// Copy snapshot of everything a unit exposes to the outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct UnitStatus {
    /// Channel identity, 1 through [`params::MAX_UNITS`].
    pub(crate) id: u8,
    /// Current operating state.
    pub(crate) state: UnitState,
    /// State before the most recent transition.
    pub(crate) previous_state: UnitState,
    /// The unit's own amplitude setpoint (informational, the shared line is
    /// driven by the coordinator).
    pub(crate) amplitude: Amplitude,
    /// Most recent frequency measurement; 0 Hz when the last window had no
    /// usable signal.
    pub(crate) frequency: Freq<u32>,
    /// Raw power proxy as sampled from the ADC.
    pub(crate) power_raw: u16,
    /// Corroborated frequency lock.
    pub(crate) locked: bool,
    /// Active fault conditions.
    pub(crate) faults: FaultMask,
    /// Faults raised over the lifetime of the unit.
    pub(crate) fault_count: u32,
    /// Mask of the most recently raised fault.
    pub(crate) last_fault: FaultMask,
    /// Instant of the most recently raised fault.
    pub(crate) last_fault_at: Option<Instant>,
    /// Times the unit has reached the running state.
    pub(crate) start_count: u32,
    /// Cumulative time spent in the running state.
    pub(crate) run_time: Duration,
    /// Instant of the most recently accepted start.
    pub(crate) last_start_at: Option<Instant>,
    /// Instant of the most recent tick.
    pub(crate) last_update_at: Option<Instant>,
}

impl UnitStatus {
    /// Renders the bit-mapped register form of the snapshot.
    #[must_use]
    pub fn flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        if self.state == UnitState::Running {
            flags |= StatusFlags::RUNNING;
        }
        if self.faults.contains(FaultMask::OVERLOAD) {
            flags |= StatusFlags::OVERLOAD;
        }
        if self.locked {
            flags |= StatusFlags::FREQ_LOCK;
        }
        if self.state.is_fault() {
            flags |= StatusFlags::FAULT;
        }
        flags
    }

    /// Output power in watts, scaled from the raw ADC sample.
    #[must_use]
    pub fn power_watts(&self) -> u16 {
        (self.power_raw.min(params::ADC_FULL_SCALE) as u32 * Ct2000::MAX_POWER_WATTS as u32
            / params::ADC_FULL_SCALE as u32) as u16
    }
}
