mod ct2000;

pub use ct2000::*;
