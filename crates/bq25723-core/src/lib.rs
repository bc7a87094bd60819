//! Core functionalities: two-wire transport, BQ25723 register access, bus log.

pub mod wire;
pub mod device;
pub mod registers;
pub mod error;
pub mod hal;
pub mod buslog;
pub mod format;

pub use wire::{TwoWire, TransmissionStatus, Pins};
pub use device::{Bq25723, DriverConfig, ERROR_SENTINEL};
pub use registers::{Register, register_name, DEFAULT_ADDRESS, ALTERNATE_ADDRESS};
pub use error::Error;
pub use hal::HalWire;
pub use buslog::{BusLog, BusEntry, Direction, LoggingWire};
pub use format::ValueFormat;
