use core::fmt;

/// Bit-mapped unit status published to the register map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct StatusFlags(u16);

bitflags::bitflags! {
    impl StatusFlags : u16 {
        /// The unit output is on and the start delay has elapsed.
        const RUNNING   = 1 << 0;
        /// The overload fault condition is active.
        const OVERLOAD  = 1 << 1;
        /// The unit reports frequency lock.
        const FREQ_LOCK = 1 << 2;
        /// The unit is in the fault state.
        const FAULT     = 1 << 3;
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(StatusFlags::RUNNING) {
            flags.push("RUNNING")
        }
        if self.contains(StatusFlags::OVERLOAD) {
            flags.push("OVERLOAD")
        }
        if self.contains(StatusFlags::FREQ_LOCK) {
            flags.push("FREQ_LOCK")
        }
        if self.contains(StatusFlags::FAULT) {
            flags.push("FAULT")
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
