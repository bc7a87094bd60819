//! [`TwoWire`] on top of an `embedded-hal` 1.0 I²C bus.

use std::collections::VecDeque;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::{debug, trace};

use crate::wire::{Pins, TransmissionStatus, TwoWire};

/// Transmit buffer size of common two-wire drivers.
pub const TX_BUFFER_LEN: usize = 32;

pub struct HalWire<I> {
    i2c: I,
    target: u8,
    tx: Vec<u8>,
    overflow: bool,
    /// Register pointer write held back for a repeated start.
    pending: Option<(u8, Vec<u8>)>,
    rx: VecDeque<u8>,
    read_status: Option<TransmissionStatus>,
    clock_hz: Option<u32>,
}

impl<I: I2c> HalWire<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            target: 0,
            tx: Vec::with_capacity(TX_BUFFER_LEN),
            overflow: false,
            pending: None,
            rx: VecDeque::new(),
            read_status: None,
            clock_hz: None,
        }
    }

    /// Last clock rate requested through [`TwoWire::set_clock`].
    pub fn requested_clock(&self) -> Option<u32> {
        self.clock_hz
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

fn status_for(kind: ErrorKind) -> TransmissionStatus {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => TransmissionStatus::AddressNack,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => TransmissionStatus::DataNack,
        _ => TransmissionStatus::Other,
    }
}

impl<I: I2c> TwoWire for HalWire<I> {
    fn begin(&mut self, pins: Option<Pins>) {
        // Line assignment is fixed when the HAL bus is constructed.
        if let Some(pins) = pins {
            debug!("ignoring pin request sda={} scl={}", pins.sda, pins.scl);
        }
        self.tx.clear();
        self.rx.clear();
        self.pending = None;
        self.read_status = None;
    }

    fn set_clock(&mut self, hz: u32) {
        debug!("clock request {hz} Hz left to the HAL bus configuration");
        self.clock_hz = Some(hz);
    }

    fn begin_transmission(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
        self.overflow = false;
    }

    fn write(&mut self, byte: u8) -> usize {
        if self.tx.len() >= TX_BUFFER_LEN {
            self.overflow = true;
            return 0;
        }
        self.tx.push(byte);
        1
    }

    fn end_transmission(&mut self, send_stop: bool) -> TransmissionStatus {
        if self.overflow {
            self.tx.clear();
            return TransmissionStatus::DataTooLong;
        }
        let bytes = std::mem::take(&mut self.tx);

        if !send_stop {
            trace!("holding {} byte(s) for {:#04x} until the read", bytes.len(), self.target);
            self.pending = Some((self.target, bytes));
            return TransmissionStatus::Success;
        }

        self.pending = None;
        match self.i2c.write(self.target, &bytes) {
            Ok(()) => TransmissionStatus::Success,
            Err(e) => {
                let status = status_for(e.kind());
                trace!("write to {:#04x} failed: {:?}", self.target, e.kind());
                status
            }
        }
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        self.rx.clear();
        self.read_status = None;
        let mut buf = vec![0u8; quantity];

        let result = match self.pending.take() {
            Some((target, prefix)) if target == address => {
                self.i2c.write_read(address, &prefix, &mut buf)
            }
            Some((target, prefix)) => {
                debug!(
                    "read from {address:#04x} while {} byte(s) for {target:#04x} were held, sending them first",
                    prefix.len()
                );
                self.i2c
                    .write(target, &prefix)
                    .and_then(|()| self.i2c.read(address, &mut buf))
            }
            None => self.i2c.read(address, &mut buf),
        };

        match result {
            Ok(()) => {
                self.rx.extend(buf);
                quantity
            }
            Err(e) => {
                trace!("read from {address:#04x} failed: {:?}", e.kind());
                self.read_status = Some(status_for(e.kind()));
                0
            }
        }
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn take_read_status(&mut self) -> Option<TransmissionStatus> {
        self.read_status.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Bq25723;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockError(ErrorKind);

    impl embedded_hal::i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[derive(Debug, PartialEq)]
    enum Op {
        Write(u8, Vec<u8>),
        Read(u8, usize),
        WriteRead(u8, Vec<u8>, usize),
    }

    #[derive(Default)]
    struct MockI2c {
        ops: Vec<Op>,
        reply: Vec<u8>,
        absent: bool,
        /// Error for everything except an empty address-only write.
        refuse: Option<ErrorKind>,
    }

    impl MockI2c {
        fn answer(&self, buf: &mut [u8]) -> Result<(), MockError> {
            if self.absent {
                return Err(MockError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
            }
            if let Some(kind) = self.refuse {
                return Err(MockError(kind));
            }
            for (dst, src) in buf.iter_mut().zip(self.reply.iter()) {
                *dst = *src;
            }
            Ok(())
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c for MockI2c {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            match operations {
                [Operation::Write(w)] => {
                    self.ops.push(Op::Write(address, w.to_vec()));
                    if w.is_empty() && !self.absent {
                        return Ok(());
                    }
                    self.answer(&mut [])
                }
                [Operation::Read(r)] => {
                    self.ops.push(Op::Read(address, r.len()));
                    self.answer(r)
                }
                [Operation::Write(w), Operation::Read(r)] => {
                    self.ops.push(Op::WriteRead(address, w.to_vec(), r.len()));
                    self.answer(r)
                }
                _ => Err(MockError(ErrorKind::Other)),
            }
        }
    }

    #[test]
    fn register_read_is_one_write_read() {
        let mut wire = HalWire::new(MockI2c {
            reply: vec![0x40, 0x00],
            ..Default::default()
        });
        let mut dev = Bq25723::new(&mut wire);
        dev.begin(None).unwrap();
        assert_eq!(dev.read_register(0x2Eu8), Ok(0x0040));

        let i2c = wire.release();
        assert_eq!(
            i2c.ops,
            vec![Op::Write(0x6B, vec![]), Op::WriteRead(0x6B, vec![0x2E], 2)]
        );
    }

    #[test]
    fn register_write_is_one_write() {
        let mut wire = HalWire::new(MockI2c::default());
        let mut dev = Bq25723::new(&mut wire);
        dev.begin(None).unwrap();
        dev.write_register(0x02u8, 0x1234).unwrap();

        let i2c = wire.release();
        assert_eq!(i2c.ops[1], Op::Write(0x6B, vec![0x02, 0x34, 0x12]));
    }

    #[test]
    fn address_nack_maps_to_status() {
        let mut wire = HalWire::new(MockI2c {
            absent: true,
            ..Default::default()
        });
        wire.begin_transmission(0x6B);
        assert_eq!(wire.end_transmission(true), TransmissionStatus::AddressNack);
        assert_eq!(wire.request_from(0x6B, 2), 0);
        assert_eq!(wire.read(), None);
    }

    #[test]
    fn oversized_write_is_rejected() {
        let mut wire = HalWire::new(MockI2c::default());
        wire.begin_transmission(0x6B);
        let accepted: usize = (0..=TX_BUFFER_LEN).map(|i| wire.write(i as u8)).sum();
        assert_eq!(accepted, TX_BUFFER_LEN);
        assert_eq!(wire.end_transmission(true), TransmissionStatus::DataTooLong);
        assert!(wire.release().ops.is_empty());
    }

    #[test]
    fn clock_request_is_recorded() {
        let mut wire = HalWire::new(MockI2c::default());
        wire.set_clock(400_000);
        assert_eq!(wire.requested_clock(), Some(400_000));
    }

    #[test]
    fn nacked_register_read_is_a_bus_error() {
        let mut wire = HalWire::new(MockI2c {
            refuse: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
            ..Default::default()
        });
        let mut dev = Bq25723::new(&mut wire);
        dev.begin(None).unwrap();
        assert_eq!(
            dev.read_register(0x22u8),
            Err(crate::Error::Bus(TransmissionStatus::DataNack))
        );
        assert_eq!(
            dev.write_register(0x22u8, 1),
            Err(crate::Error::Bus(TransmissionStatus::DataNack))
        );
    }

    #[test]
    fn read_status_is_taken_once() {
        let mut wire = HalWire::new(MockI2c {
            refuse: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)),
            ..Default::default()
        });
        assert_eq!(wire.request_from(0x6B, 2), 0);
        assert_eq!(wire.take_read_status(), Some(TransmissionStatus::Other));
        assert_eq!(wire.take_read_status(), None);
    }

    #[test]
    fn other_bus_errors_map_to_other() {
        assert_eq!(status_for(ErrorKind::Bus), TransmissionStatus::Other);
        assert_eq!(status_for(ErrorKind::ArbitrationLoss), TransmissionStatus::Other);
        assert_eq!(
            status_for(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)),
            TransmissionStatus::Other
        );
    }

    #[test]
    fn held_write_for_another_address_is_sent_first() {
        let mut wire = HalWire::new(MockI2c {
            reply: vec![0xAA, 0x55],
            ..Default::default()
        });
        wire.begin_transmission(0x10);
        wire.write(0x01);
        assert!(wire.end_transmission(false).is_success());
        assert_eq!(wire.request_from(0x6B, 2), 2);
        assert_eq!(wire.read(), Some(0xAA));

        let i2c = wire.release();
        assert_eq!(i2c.ops, vec![Op::Write(0x10, vec![0x01]), Op::Read(0x6B, 2)]);
    }
}
