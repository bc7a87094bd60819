use serde::{Deserialize, Serialize};

/// One transaction as seen on the simulated bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2cFrame {
    pub address: u8,
    /// `true` for a read transaction.
    pub rw: bool,
    pub data: Vec<u8>,
    pub acked: bool,
}

impl I2cFrame {
    pub fn write(address: u8, data: Vec<u8>, acked: bool) -> Self {
        Self { address, rw: false, data, acked }
    }

    pub fn read(address: u8, data: Vec<u8>, acked: bool) -> Self {
        Self { address, rw: true, data, acked }
    }
}
