use log::{debug, trace, warn};

use crate::error::Error;
use crate::registers::{self, DEFAULT_ADDRESS};
use crate::wire::{Pins, TwoWire};

/// Value the lossy read helpers report for a failed register.
pub const ERROR_SENTINEL: u16 = 0xFFFF;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub address: u8,
    pub clock_hz: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            clock_hz: 100_000,
        }
    }
}

/// Register access to a single BQ25723 on a borrowed two-wire bus.
///
/// Nothing touches the bus until [`Bq25723::begin`] succeeds; register reads
/// and writes fail with [`Error::NotInitialized`] before that, and again after
/// [`Bq25723::set_address`].
pub struct Bq25723<'a, W: TwoWire> {
    wire: &'a mut W,
    cfg: DriverConfig,
    initialized: bool,
}

impl<'a, W: TwoWire> Bq25723<'a, W> {
    /// Handle at the default address and 100 kHz.
    pub fn new(wire: &'a mut W) -> Self {
        Self::with_config(wire, DriverConfig::default())
    }

    pub fn with_config(wire: &'a mut W, cfg: DriverConfig) -> Self {
        Self {
            wire,
            cfg,
            initialized: false,
        }
    }

    /// Configure the bus and probe the device.
    pub fn begin(&mut self, pins: Option<Pins>) -> Result<(), Error> {
        debug!(
            "begin: address {:#04x}, clock {} Hz, pins {:?}",
            self.cfg.address, self.cfg.clock_hz, pins
        );
        self.wire.begin(pins);
        self.wire.set_clock(self.cfg.clock_hz);

        if !self.is_connected() {
            warn!("no BQ25723 acknowledged at {:#04x}", self.cfg.address);
            self.initialized = false;
            return Err(Error::NotDetected { address: self.cfg.address });
        }

        self.initialized = true;
        Ok(())
    }

    /// Zero-length probe. Always hits the bus, initialized or not.
    pub fn is_connected(&mut self) -> bool {
        self.wire.begin_transmission(self.cfg.address);
        let status = self.wire.end_transmission(true);
        trace!("probe {:#04x}: {status}", self.cfg.address);
        status.is_success()
    }

    pub fn read_register(&mut self, reg: impl Into<u8>) -> Result<u16, Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let reg = reg.into();

        self.wire.begin_transmission(self.cfg.address);
        self.wire.write(reg);
        let status = self.wire.end_transmission(false);
        if !status.is_success() {
            trace!("read {reg:#04x}: address phase failed, {status}");
            return Err(Error::Bus(status));
        }

        let received = self.wire.request_from(self.cfg.address, 2);
        if received != 2 {
            trace!("read {reg:#04x}: got {received} of 2 bytes");
            return Err(match self.wire.take_read_status() {
                Some(status) if !status.is_success() => Error::Bus(status),
                _ => Error::ShortRead { expected: 2, received },
            });
        }

        // Low byte arrives first.
        let (lsb, msb) = match (self.wire.read(), self.wire.read()) {
            (Some(lsb), Some(msb)) => (lsb, msb),
            (Some(_), None) => return Err(Error::ShortRead { expected: 2, received: 1 }),
            _ => return Err(Error::ShortRead { expected: 2, received: 0 }),
        };
        let value = u16::from_le_bytes([lsb, msb]);
        trace!("read {reg:#04x} ({}) = {value:#06x}", registers::register_name(reg));
        Ok(value)
    }

    /// Like [`Bq25723::read_register`] but reports any failure as
    /// [`ERROR_SENTINEL`], which a register holding `0xFFFF` also returns.
    pub fn read_register_or_sentinel(&mut self, reg: impl Into<u8>) -> u16 {
        self.read_register(reg).unwrap_or(ERROR_SENTINEL)
    }

    pub fn write_register(&mut self, reg: impl Into<u8>, value: u16) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let reg = reg.into();
        let [lsb, msb] = value.to_le_bytes();

        self.wire.begin_transmission(self.cfg.address);
        self.wire.write(reg);
        self.wire.write(lsb);
        self.wire.write(msb);
        let status = self.wire.end_transmission(true);
        trace!("write {reg:#04x} ({}) = {value:#06x}: {status}", registers::register_name(reg));

        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Bus(status))
        }
    }

    /// Read `buf.len()` registers at consecutive addresses from `start`, one
    /// transaction each. Failed slots hold [`ERROR_SENTINEL`]. Returns how
    /// many reads succeeded.
    pub fn read_multiple_registers(&mut self, start: u8, buf: &mut [u16]) -> usize {
        if !self.initialized || buf.is_empty() {
            return 0;
        }

        let mut ok = 0;
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.read_register(start.wrapping_add(i as u8)) {
                Ok(value) => {
                    *slot = value;
                    ok += 1;
                }
                Err(_) => *slot = ERROR_SENTINEL,
            }
        }
        ok
    }

    /// Consecutive single-register reads with a result per register.
    pub fn read_registers(&mut self, start: u8, count: usize) -> Vec<Result<u16, Error>> {
        (0..count)
            .map(|i| self.read_register(start.wrapping_add(i as u8)))
            .collect()
    }

    pub fn address(&self) -> u8 {
        self.cfg.address
    }

    /// Point the handle at another address. The device has to be probed
    /// again with [`Bq25723::begin`] before register access.
    pub fn set_address(&mut self, address: u8) {
        debug!("address {:#04x} -> {address:#04x}", self.cfg.address);
        self.cfg.address = address;
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn clock_hz(&self) -> u32 {
        self.cfg.clock_hz
    }

    pub fn config(&self) -> &DriverConfig {
        &self.cfg
    }

    pub fn register_name(addr: u8) -> &'static str {
        registers::register_name(addr)
    }
}
