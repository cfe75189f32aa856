mod faults;
mod lifecycle;
mod shared;
