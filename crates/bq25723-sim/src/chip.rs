use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bq25723_core::{Pins, Register, TransmissionStatus, TwoWire, DEFAULT_ADDRESS};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::i2c::I2cFrame;

const MANUFACTURER_ID: u8 = 0x40;

/// Frames kept before the oldest are dropped.
pub const DEFAULT_FRAME_LIMIT: usize = 4096;

/// Register image a [`SimulatedCharger`] can be loaded from or saved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub address: u8,
    pub registers: BTreeMap<u8, u16>,
}

/// In-memory BQ25723.
///
/// The chip is a 256-byte file behind a register pointer. A write
/// transaction sets the pointer from its first byte and stores the rest from
/// there upward; a read returns bytes from the pointer upward. So a 16-bit
/// register at `A` lives in bytes `A` (low) and `A + 1` (high).
pub struct SimulatedCharger {
    address: u8,
    present: bool,
    bytes: [u8; 256],
    failing: BTreeSet<u8>,
    pointer: u8,
    target: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    frames: Vec<I2cFrame>,
    frame_limit: usize,
    read_status: Option<TransmissionStatus>,
    calls: usize,
    clock_hz: Option<u32>,
    pins: Option<Pins>,
}

impl Default for SimulatedCharger {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl SimulatedCharger {
    pub fn new(address: u8) -> Self {
        let mut bytes = [0u8; 256];
        bytes[Register::ManufacturerId.addr() as usize] = MANUFACTURER_ID;
        Self {
            address,
            present: true,
            bytes,
            failing: BTreeSet::new(),
            pointer: 0,
            target: 0,
            tx: Vec::new(),
            rx: VecDeque::new(),
            frames: Vec::new(),
            frame_limit: DEFAULT_FRAME_LIMIT,
            read_status: None,
            calls: 0,
            clock_hz: None,
            pins: None,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut chip = Self::new(snapshot.address);
        for (&addr, &value) in &snapshot.registers {
            chip.set_register(addr, value);
        }
        chip
    }

    /// Current values of every named register.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            address: self.address,
            registers: Register::ALL
                .iter()
                .map(|reg| (reg.addr(), self.register(reg.addr())))
                .collect(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn set_device_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Pull the chip off the bus (or put it back). Absent chips NACK.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn register(&self, addr: u8) -> u16 {
        u16::from_le_bytes([self.bytes[addr as usize], self.bytes[addr.wrapping_add(1) as usize]])
    }

    pub fn set_register(&mut self, addr: u8, value: u16) {
        let [lsb, msb] = value.to_le_bytes();
        self.bytes[addr as usize] = lsb;
        self.bytes[addr.wrapping_add(1) as usize] = msb;
    }

    /// Every access with the pointer at `addr` fails from now on.
    pub fn fail_register(&mut self, addr: u8) {
        self.failing.insert(addr);
    }

    pub fn clear_faults(&mut self) {
        self.failing.clear();
    }

    pub fn frames(&self) -> &[I2cFrame] {
        &self.frames
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Keep at most `limit` frames, dropping the oldest first.
    pub fn set_frame_limit(&mut self, limit: usize) {
        self.frame_limit = limit;
        self.trim_frames();
    }

    fn push_frame(&mut self, frame: I2cFrame) {
        self.frames.push(frame);
        self.trim_frames();
    }

    fn trim_frames(&mut self) {
        if self.frames.len() > self.frame_limit {
            let excess = self.frames.len() - self.frame_limit;
            self.frames.drain(..excess);
        }
    }

    /// Number of transport calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn clock_hz(&self) -> Option<u32> {
        self.clock_hz
    }

    pub fn pins(&self) -> Option<Pins> {
        self.pins
    }

    fn answers(&self, address: u8) -> bool {
        self.present && address == self.address
    }
}

impl TwoWire for SimulatedCharger {
    fn begin(&mut self, pins: Option<Pins>) {
        self.calls += 1;
        self.pins = pins;
    }

    fn set_clock(&mut self, hz: u32) {
        self.calls += 1;
        self.clock_hz = Some(hz);
    }

    fn begin_transmission(&mut self, address: u8) {
        self.calls += 1;
        self.target = address;
        self.tx.clear();
    }

    fn write(&mut self, byte: u8) -> usize {
        self.calls += 1;
        self.tx.push(byte);
        1
    }

    fn end_transmission(&mut self, _send_stop: bool) -> TransmissionStatus {
        self.calls += 1;
        let data = std::mem::take(&mut self.tx);

        if !self.answers(self.target) {
            trace!("sim: NACK for {:#04x}", self.target);
            self.push_frame(I2cFrame::write(self.target, data, false));
            return TransmissionStatus::AddressNack;
        }

        let status = match data.split_first() {
            None => TransmissionStatus::Success,
            Some((&pointer, payload)) => {
                self.pointer = pointer;
                if self.failing.contains(&pointer) {
                    TransmissionStatus::DataNack
                } else {
                    for (i, &byte) in payload.iter().enumerate() {
                        self.bytes[pointer.wrapping_add(i as u8) as usize] = byte;
                    }
                    TransmissionStatus::Success
                }
            }
        };

        self.push_frame(I2cFrame::write(self.target, data, status.is_success()));
        status
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        self.calls += 1;
        self.rx.clear();
        self.read_status = None;

        let refused = if !self.answers(address) {
            Some(TransmissionStatus::AddressNack)
        } else if self.failing.contains(&self.pointer) {
            Some(TransmissionStatus::DataNack)
        } else {
            None
        };
        if let Some(status) = refused {
            trace!("sim: read of {:#04x} at pointer {:#04x} refused", address, self.pointer);
            self.push_frame(I2cFrame::read(address, Vec::new(), false));
            self.read_status = Some(status);
            return 0;
        }

        for i in 0..quantity {
            self.rx.push_back(self.bytes[self.pointer.wrapping_add(i as u8) as usize]);
        }
        let data = self.rx.iter().copied().collect();
        self.push_frame(I2cFrame::read(address, data, true));
        quantity
    }

    fn read(&mut self) -> Option<u8> {
        self.calls += 1;
        self.rx.pop_front()
    }

    fn take_read_status(&mut self) -> Option<TransmissionStatus> {
        self.read_status.take()
    }
}
