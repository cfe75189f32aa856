use core::time::Duration;

pub const MAX_UNITS: usize = 4;

pub const START_DELAY: Duration = Duration::from_millis(250);
pub const STOP_DELAY: Duration = Duration::from_millis(100);

pub const OVERLOAD_DEBOUNCE: Duration = Duration::from_millis(50);
pub const RESET_PULSE_WIDTH: Duration = Duration::from_millis(100);

pub const COMM_TIMEOUT: Duration = Duration::from_secs(1);
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(1);
pub const NO_SIGNAL_TIMEOUT: Duration = Duration::from_secs(2);

pub const WINDOW_DEFAULT: Duration = Duration::from_millis(100);
pub const WINDOW_MIN: Duration = Duration::from_millis(10);
pub const WINDOW_MAX: Duration = Duration::from_secs(1);

pub const NOISE_FILTER_DEFAULT: u32 = 10;
pub const NOISE_FILTER_MIN: u32 = 1;
pub const NOISE_FILTER_MAX: u32 = 10_000;

pub const PUBLISH_INTERVAL: Duration = Duration::from_millis(50);
pub const COMMAND_LATENCY_TARGET: Duration = Duration::from_millis(100);

pub const ADC_FULL_SCALE: u16 = 1023;
