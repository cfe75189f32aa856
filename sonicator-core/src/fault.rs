use core::fmt;

/// Fault conditions of a sonicator unit.
///
/// A unit is in [`UnitState::Fault`] if and only if its mask is non-empty.
///
/// [`UnitState::Fault`]: crate::state::UnitState::Fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct FaultMask(u16);

bitflags::bitflags! {
    impl FaultMask : u16 {
        /// No fault condition is active.
        const NONE             = 0;
        /// The overload input has been asserted past the debounce interval.
        const OVERLOAD         = 1 << 0;
        /// Frequency lock was lost while running.
        const FREQUENCY_UNLOCK = 1 << 1;
        /// No external register write for longer than the comm timeout.
        const COMM_TIMEOUT     = 1 << 2;
        /// The tick loop failed to service the watchdog in time.
        const WATCHDOG_EXPIRED = 1 << 3;
    }
}

impl fmt::Display for FaultMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(FaultMask::OVERLOAD) {
            flags.push("OVERLOAD")
        }
        if self.contains(FaultMask::FREQUENCY_UNLOCK) {
            flags.push("FREQUENCY_UNLOCK")
        }
        if self.contains(FaultMask::COMM_TIMEOUT) {
            flags.push("COMM_TIMEOUT")
        }
        if self.contains(FaultMask::WATCHDOG_EXPIRED) {
            flags.push("WATCHDOG_EXPIRED")
        }
        if self.is_empty() {
            flags.push("NONE")
        }
        write!(
            f,
            "{}",
            flags
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }
}
