use std::fmt;

/// Explicit SDA/SCL line assignment handed to [`TwoWire::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    pub sda: u8,
    pub scl: u8,
}

/// Outcome of [`TwoWire::end_transmission`].
///
/// The discriminants follow the status codes two-wire bus drivers commonly
/// report, so a raw code can be mapped with [`TransmissionStatus::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionStatus {
    Success = 0,
    DataTooLong = 1,
    AddressNack = 2,
    DataNack = 3,
    Other = 4,
    Timeout = 5,
}

impl TransmissionStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::DataTooLong,
            2 => Self::AddressNack,
            3 => Self::DataNack,
            5 => Self::Timeout,
            _ => Self::Other,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for TransmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::DataTooLong => "data too long for transmit buffer",
            Self::AddressNack => "address not acknowledged",
            Self::DataNack => "data not acknowledged",
            Self::Other => "bus error",
            Self::Timeout => "timeout",
        };
        write!(f, "{text} ({})", self.code())
    }
}

/// Byte-oriented two-wire bus transport.
///
/// A write transaction is `begin_transmission`, any number of `write`s, then
/// `end_transmission`. Passing `send_stop = false` keeps the bus so that the
/// following `request_from` is issued with a repeated start. Received bytes
/// are handed out one at a time by `read`, in arrival order.
///
/// Timeouts are the transport's business; every call blocks until the
/// transport is done.
pub trait TwoWire {
    /// Bring the bus up, optionally on explicit lines.
    fn begin(&mut self, pins: Option<Pins>);

    fn set_clock(&mut self, hz: u32);

    fn begin_transmission(&mut self, address: u8);

    /// Queue one byte of the current transmission. Returns the number of
    /// bytes accepted.
    fn write(&mut self, byte: u8) -> usize;

    fn end_transmission(&mut self, send_stop: bool) -> TransmissionStatus;

    /// Read `quantity` bytes from `address`. Returns how many arrived.
    fn request_from(&mut self, address: u8, quantity: usize) -> usize;

    fn read(&mut self) -> Option<u8>;

    /// Why the last `request_from` came back short, if the transport knows.
    /// Taking it clears it.
    fn take_read_status(&mut self) -> Option<TransmissionStatus> {
        None
    }
}

impl<W: TwoWire + ?Sized> TwoWire for &mut W {
    fn begin(&mut self, pins: Option<Pins>) {
        (**self).begin(pins)
    }

    fn set_clock(&mut self, hz: u32) {
        (**self).set_clock(hz)
    }

    fn begin_transmission(&mut self, address: u8) {
        (**self).begin_transmission(address)
    }

    fn write(&mut self, byte: u8) -> usize {
        (**self).write(byte)
    }

    fn end_transmission(&mut self, send_stop: bool) -> TransmissionStatus {
        (**self).end_transmission(send_stop)
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        (**self).request_from(address, quantity)
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn take_read_status(&mut self) -> Option<TransmissionStatus> {
        (**self).take_read_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_back() {
        for status in [
            TransmissionStatus::Success,
            TransmissionStatus::DataTooLong,
            TransmissionStatus::AddressNack,
            TransmissionStatus::DataNack,
            TransmissionStatus::Other,
            TransmissionStatus::Timeout,
        ] {
            assert_eq!(TransmissionStatus::from_code(status.code()), status);
        }
        assert_eq!(TransmissionStatus::from_code(42), TransmissionStatus::Other);
    }

    #[test]
    fn only_success_is_success() {
        assert!(TransmissionStatus::Success.is_success());
        assert!(!TransmissionStatus::AddressNack.is_success());
        assert!(!TransmissionStatus::Timeout.is_success());
    }
}
