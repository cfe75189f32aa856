mod amplitude;
mod freq;
mod instant;

pub use amplitude::*;
pub use freq::*;
pub use instant::*;
