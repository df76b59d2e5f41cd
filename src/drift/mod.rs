pub mod signal;

mod monitor;

pub use monitor::DriftMonitor;
