use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use getset::CopyGetters;

use sonicator_core::{
    common::{Freq, Hz, Instant},
    devices::Ct2000,
    error::{ConfigError, CounterError},
};

use crate::params;

/// Lifetime statistics of one capture channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, CopyGetters)]
pub struct ChannelStats {
    /// Completed sampling windows.
    #[getset(get_copy = "pub")]
    windows: u64,
    /// Windows that produced an accepted measurement.
    #[getset(get_copy = "pub")]
    accepted: u64,
    /// Windows rejected for too few edges or an implausible result.
    #[getset(get_copy = "pub")]
    errors: u64,
    /// Windows rejected by the noise filter alone.
    #[getset(get_copy = "pub")]
    noise_rejected: u64,
    /// Edges consumed since creation or the last stats reset.
    #[getset(get_copy = "pub")]
    edges_total: u64,
}

struct CaptureChannel {
    // written from capture interrupt context, drained by the tick
    edges: AtomicU32,
    window_started: Instant,
    last: Freq<u32>,
    last_valid: Freq<u32>,
    last_edge_at: Instant,
    ready: bool,
    stats: ChannelStats,
}

impl CaptureChannel {
    fn new(now: Instant) -> Self {
        Self {
            edges: AtomicU32::new(0),
            window_started: now,
            last: 0 * Hz,
            last_valid: 0 * Hz,
            last_edge_at: now,
            ready: false,
            stats: ChannelStats::default(),
        }
    }
}

/// Windowed frequency counter over the units' frequency monitor outputs.
///
/// Edge capture runs in interrupt context through [`record_edge`]; everything
/// else belongs to the tick. The edge count is the only state crossing that
/// boundary and is handed over by an atomic swap, so a snapshot can never
/// tear. The window bookkeeping stays on the tick side.
///
/// The monitor output of the unit runs at a tenth of the operating frequency,
/// so measurements are corrected by [`Ct2000::FREQ_DIVIDER`] before use.
///
/// [`record_edge`]: FrequencyCounter::record_edge
#[derive(CopyGetters)]
pub struct FrequencyCounter {
    channels: Vec<CaptureChannel>,
    /// The sampling window.
    #[getset(get_copy = "pub")]
    window: Duration,
    /// Minimum number of edges a window must deliver to count as signal.
    #[getset(get_copy = "pub")]
    min_edges: u32,
}

impl FrequencyCounter {
    /// Creates a counter with `channels` capture channels.
    #[must_use]
    pub fn new(channels: usize, now: Instant) -> Self {
        Self {
            channels: (0..channels).map(|_| CaptureChannel::new(now)).collect(),
            window: params::WINDOW_DEFAULT,
            min_edges: params::NOISE_FILTER_DEFAULT,
        }
    }

    /// Returns the number of capture channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Records one edge on `channel`.
    ///
    /// Callable from capture interrupt context: constant time, no allocation,
    /// no lock. Unknown channels are ignored.
    #[inline]
    pub fn record_edge(&self, channel: usize) {
        if let Some(ch) = self.channels.get(channel) {
            ch.edges.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Closes the current window of `channel` and computes a new measurement.
    ///
    /// A window with fewer edges than the noise filter threshold yields 0 Hz.
    /// A result outside [`Ct2000::PLAUSIBLE_BAND`] is discarded and the
    /// previous plausible measurement is returned. Both cases count as
    /// errors in the channel statistics.
    pub fn calculate(&mut self, channel: usize, now: Instant) -> Result<Freq<u32>, CounterError> {
        let min_edges = self.min_edges;
        let ch = self
            .channels
            .get_mut(channel)
            .ok_or(CounterError::InvalidChannel(channel))?;

        let edges = ch.edges.swap(0, Ordering::AcqRel);
        let window = now.duration_since(ch.window_started);
        ch.window_started = now;
        ch.ready = true;

        ch.stats.windows += 1;
        ch.stats.edges_total += edges as u64;
        if edges > 0 {
            ch.last_edge_at = now;
        }

        if edges < min_edges {
            ch.stats.errors += 1;
            ch.stats.noise_rejected += 1;
            ch.last = 0 * Hz;
            return Ok(ch.last);
        }

        let micros = window.as_micros().max(1) as u64;
        let raw = edges as u64 * 1_000_000 / micros;
        let corrected = raw * Ct2000::FREQ_DIVIDER as u64;
        let measured = u32::try_from(corrected).unwrap_or(u32::MAX) * Hz;

        if !Ct2000::PLAUSIBLE_BAND.contains(&measured) {
            ch.stats.errors += 1;
            ch.last = ch.last_valid;
            return Ok(ch.last);
        }

        ch.stats.accepted += 1;
        ch.last = measured;
        ch.last_valid = measured;
        Ok(measured)
    }

    /// Returns the measurement of `channel`, closing the sampling window
    /// first when it has elapsed.
    pub fn sample(&mut self, channel: usize, now: Instant) -> Result<Freq<u32>, CounterError> {
        let ch = self
            .channels
            .get(channel)
            .ok_or(CounterError::InvalidChannel(channel))?;
        if now.duration_since(ch.window_started) >= self.window {
            self.calculate(channel, now)
        } else {
            Ok(ch.last)
        }
    }

    /// Returns whether `channel` has completed at least one sampling window,
    /// distinguishing a measured 0 Hz from a measurement that never ran.
    pub fn is_ready(&self, channel: usize) -> Result<bool, CounterError> {
        self.channels
            .get(channel)
            .map(|ch| ch.ready)
            .ok_or(CounterError::InvalidChannel(channel))
    }

    /// Checks that `channel` has seen an edge within the no-signal timeout.
    pub fn signal_check(&self, channel: usize, now: Instant) -> Result<(), CounterError> {
        let ch = self
            .channels
            .get(channel)
            .ok_or(CounterError::InvalidChannel(channel))?;
        let silent = now.duration_since(ch.last_edge_at);
        if silent >= params::NO_SIGNAL_TIMEOUT {
            return Err(CounterError::NoSignal(silent));
        }
        Ok(())
    }

    /// Sets the sampling window. Out-of-range values are rejected and the
    /// previous window stays in effect.
    pub fn set_window(&mut self, window: Duration) -> Result<(), ConfigError> {
        if !(params::WINDOW_MIN..=params::WINDOW_MAX).contains(&window) {
            return Err(ConfigError::WindowOutOfRange(
                window,
                params::WINDOW_MIN,
                params::WINDOW_MAX,
            ));
        }
        self.window = window;
        Ok(())
    }

    /// Sets the noise filter threshold. Out-of-range values are rejected and
    /// the previous threshold stays in effect.
    pub fn set_noise_filter(&mut self, min_edges: u32) -> Result<(), ConfigError> {
        if !(params::NOISE_FILTER_MIN..=params::NOISE_FILTER_MAX).contains(&min_edges) {
            return Err(ConfigError::NoiseFilterOutOfRange(
                min_edges,
                params::NOISE_FILTER_MIN,
                params::NOISE_FILTER_MAX,
            ));
        }
        self.min_edges = min_edges;
        Ok(())
    }

    /// Returns the lifetime statistics of `channel`.
    pub fn stats(&self, channel: usize) -> Result<ChannelStats, CounterError> {
        self.channels
            .get(channel)
            .map(|ch| ch.stats)
            .ok_or(CounterError::InvalidChannel(channel))
    }

    /// Zeroes the statistics of `channel`. The last measurement is unaffected.
    pub fn reset_stats(&mut self, channel: usize) -> Result<(), CounterError> {
        self.channels
            .get_mut(channel)
            .map(|ch| ch.stats = ChannelStats::default())
            .ok_or(CounterError::InvalidChannel(channel))
    }

    /// Zeroes the statistics of every channel.
    pub fn reset_all_stats(&mut self) {
        self.channels
            .iter_mut()
            .for_each(|ch| ch.stats = ChannelStats::default());
    }
}
