//! Software model of the BQ25723 that plugs into the driver as a transport.

pub mod i2c;
pub mod chip;

pub use i2c::I2cFrame;
pub use chip::{SimulatedCharger, Snapshot, DEFAULT_FRAME_LIMIT};
