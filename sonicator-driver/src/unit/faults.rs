use sonicator_core::{common::Instant, fault::FaultMask};

use crate::params;

/// Debounced overload input.
///
/// The raw line must stay asserted for the full debounce interval before the
/// condition latches. Once latched it stays until an explicit reset, matching
/// the latch in the unit hardware.
#[derive(Clone, Copy, Debug, Default)]
struct OverloadDebounce {
    asserted_since: Option<Instant>,
    latched: bool,
}

impl OverloadDebounce {
    fn update(&mut self, raw: bool, now: Instant) -> bool {
        if raw {
            let since = *self.asserted_since.get_or_insert(now);
            if now.duration_since(since) >= params::OVERLOAD_DEBOUNCE {
                self.latched = true;
            }
        } else {
            self.asserted_since = None;
        }
        self.latched
    }

    fn reset(&mut self) {
        self.asserted_since = None;
        self.latched = false;
    }
}

/// Current conditions a unit feeds into fault evaluation, once per tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FaultInputs {
    pub overload_raw: bool,
    pub lock_ok: bool,
    pub running: bool,
    pub last_external_write: Option<Instant>,
    pub watchdog_serviced_at: Instant,
}

/// Per-unit fault bookkeeping.
///
/// The mask is re-derived from current conditions on every evaluation. The
/// timeout conditions clear themselves as soon as their freshness holds
/// again; the overload condition includes the hardware latch and clears only
/// through [`reset_overload`]. Each active condition carries the instant it
/// was first seen.
///
/// [`reset_overload`]: FaultMonitor::reset_overload
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FaultMonitor {
    overload: OverloadDebounce,
    mask: FaultMask,
    overload_since: Option<Instant>,
    unlock_since: Option<Instant>,
    comm_since: Option<Instant>,
    watchdog_since: Option<Instant>,
}

impl FaultMonitor {
    pub fn evaluate(&mut self, inputs: FaultInputs, now: Instant) -> FaultMask {
        let mut mask = FaultMask::NONE;

        if self.overload.update(inputs.overload_raw, now) {
            mask |= FaultMask::OVERLOAD;
        }
        if inputs.running && !inputs.lock_ok {
            mask |= FaultMask::FREQUENCY_UNLOCK;
        }
        if let Some(written) = inputs.last_external_write {
            if now.duration_since(written) > params::COMM_TIMEOUT {
                mask |= FaultMask::COMM_TIMEOUT;
            }
        }
        if now.duration_since(inputs.watchdog_serviced_at) > params::WATCHDOG_TIMEOUT {
            mask |= FaultMask::WATCHDOG_EXPIRED;
        }

        Self::stamp(&mut self.overload_since, mask.contains(FaultMask::OVERLOAD), now);
        Self::stamp(
            &mut self.unlock_since,
            mask.contains(FaultMask::FREQUENCY_UNLOCK),
            now,
        );
        Self::stamp(&mut self.comm_since, mask.contains(FaultMask::COMM_TIMEOUT), now);
        Self::stamp(
            &mut self.watchdog_since,
            mask.contains(FaultMask::WATCHDOG_EXPIRED),
            now,
        );

        self.mask = mask;
        mask
    }

    fn stamp(slot: &mut Option<Instant>, active: bool, now: Instant) {
        if active {
            slot.get_or_insert(now);
        } else {
            *slot = None;
        }
    }

    pub fn mask(&self) -> FaultMask {
        self.mask
    }

    /// Clears the overload latch. The mask entry goes with it so the
    /// state machine sees the effect immediately.
    pub fn reset_overload(&mut self) {
        self.overload.reset();
        self.overload_since = None;
        self.mask.remove(FaultMask::OVERLOAD);
    }

    /// Drops every condition, the overload latch and debounce included.
    ///
    /// For the emergency-stop path. An overload still physically present
    /// re-latches after a fresh debounce interval.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Instant at which `condition` became active, if it is.
    pub fn active_since(&self, condition: FaultMask) -> Option<Instant> {
        match condition {
            FaultMask::OVERLOAD => self.overload_since,
            FaultMask::FREQUENCY_UNLOCK => self.unlock_since,
            FaultMask::COMM_TIMEOUT => self.comm_since,
            FaultMask::WATCHDOG_EXPIRED => self.watchdog_since,
            _ => None,
        }
    }
}
