use crate::wire::TransmissionStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("device not initialized, call begin() first")]
    NotInitialized,

    #[error("no device acknowledged at address {address:#04x}")]
    NotDetected { address: u8 },

    #[error("bus transaction failed: {0}")]
    Bus(TransmissionStatus),

    #[error("short read: expected {expected} bytes, received {received}")]
    ShortRead { expected: usize, received: usize },
}
