use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::wire::{Pins, TransmissionStatus, TwoWire};

#[derive(Debug, Clone)]
pub struct BusEntry {
    pub timestamp: u64,
    pub direction: Direction,
    pub address: u8,
    pub data: Vec<u8>,
    /// Write status, or `None` for reads.
    pub status: Option<TransmissionStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Rx,
    Tx,
}

pub struct BusLog {
    entries: VecDeque<BusEntry>,
    max_entries: usize,
}

impl BusLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    pub fn push(&mut self, direction: Direction, address: u8, data: Vec<u8>, status: Option<TransmissionStatus>) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        self.entries.push_back(BusEntry {
            timestamp,
            direction,
            address,
            data,
            status,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &BusEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_text(&self, show_timestamp: bool) -> String {
        let mut result = String::new();
        for entry in &self.entries {
            if show_timestamp {
                let secs = entry.timestamp / 1000;
                let millis = entry.timestamp % 1000;
                let hours = (secs / 3600) % 24;
                let minutes = (secs / 60) % 60;
                let seconds = secs % 60;
                result.push_str(&format!("[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] "));
            }

            let prefix = match entry.direction {
                Direction::Rx => "RX",
                Direction::Tx => "TX",
            };
            result.push_str(&format!("{prefix} {:02X}:", entry.address));
            for byte in &entry.data {
                result.push_str(&format!(" {byte:02X}"));
            }
            match entry.status {
                Some(status) if !status.is_success() => result.push_str(&format!(" ({status})")),
                None if entry.data.is_empty() => result.push_str(" (no data)"),
                _ => {}
            }
            result.push('\n');
        }
        result
    }
}

/// Transport wrapper that records every transaction in a [`BusLog`].
pub struct LoggingWire<W> {
    inner: W,
    log: BusLog,
    target: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
}

impl<W: TwoWire> LoggingWire<W> {
    pub fn new(inner: W, max_entries: usize) -> Self {
        Self {
            inner,
            log: BusLog::new(max_entries),
            target: 0,
            tx: Vec::new(),
            rx: VecDeque::new(),
        }
    }

    pub fn log(&self) -> &BusLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut BusLog {
        &mut self.log
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: TwoWire> TwoWire for LoggingWire<W> {
    fn begin(&mut self, pins: Option<Pins>) {
        self.inner.begin(pins)
    }

    fn set_clock(&mut self, hz: u32) {
        self.inner.set_clock(hz)
    }

    fn begin_transmission(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
        self.inner.begin_transmission(address)
    }

    fn write(&mut self, byte: u8) -> usize {
        let n = self.inner.write(byte);
        if n > 0 {
            self.tx.push(byte);
        }
        n
    }

    fn end_transmission(&mut self, send_stop: bool) -> TransmissionStatus {
        let status = self.inner.end_transmission(send_stop);
        let data = std::mem::take(&mut self.tx);
        self.log.push(Direction::Tx, self.target, data, Some(status));
        status
    }

    fn request_from(&mut self, address: u8, quantity: usize) -> usize {
        let n = self.inner.request_from(address, quantity);
        self.rx.clear();
        for _ in 0..n {
            match self.inner.read() {
                Some(byte) => self.rx.push_back(byte),
                None => break,
            }
        }
        self.log.push(Direction::Rx, address, self.rx.iter().copied().collect(), None);
        n
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn take_read_status(&mut self) -> Option<TransmissionStatus> {
        self.inner.take_read_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Acks everything and answers reads with an incrementing counter.
    #[derive(Default)]
    struct Counter {
        next: u8,
        pending: u8,
    }

    impl TwoWire for Counter {
        fn begin(&mut self, _pins: Option<Pins>) {}
        fn set_clock(&mut self, _hz: u32) {}
        fn begin_transmission(&mut self, _address: u8) {}
        fn write(&mut self, _byte: u8) -> usize {
            1
        }
        fn end_transmission(&mut self, _send_stop: bool) -> TransmissionStatus {
            TransmissionStatus::Success
        }
        fn request_from(&mut self, _address: u8, quantity: usize) -> usize {
            self.pending = quantity as u8;
            quantity
        }
        fn read(&mut self) -> Option<u8> {
            if self.pending == 0 {
                return None;
            }
            self.pending -= 1;
            self.next += 1;
            Some(self.next)
        }
    }

    #[test]
    fn oldest_entries_drop() {
        let mut log = BusLog::new(2);
        log.push(Direction::Tx, 0x6B, vec![1], Some(TransmissionStatus::Success));
        log.push(Direction::Tx, 0x6B, vec![2], Some(TransmissionStatus::Success));
        log.push(Direction::Rx, 0x6B, vec![3], None);
        assert_eq!(log.len(), 2);
        let data: Vec<_> = log.entries().map(|e| e.data[0]).collect();
        assert_eq!(data, vec![2, 3]);
    }

    #[test]
    fn hex_dump_marks_failures() {
        let mut log = BusLog::new(8);
        log.push(Direction::Tx, 0x6B, vec![0x20], Some(TransmissionStatus::Success));
        log.push(Direction::Rx, 0x6B, vec![0x34, 0x12], None);
        log.push(Direction::Tx, 0x6A, vec![], Some(TransmissionStatus::AddressNack));
        assert_eq!(
            log.to_text(false),
            "TX 6B: 20\nRX 6B: 34 12\nTX 6A: (address not acknowledged (2))\n"
        );
    }

    #[test]
    fn wrapper_records_and_replays() {
        let mut wire = LoggingWire::new(Counter::default(), 16);
        wire.begin_transmission(0x6B);
        wire.write(0x02);
        assert!(wire.end_transmission(false).is_success());
        assert_eq!(wire.request_from(0x6B, 2), 2);
        assert_eq!(wire.read(), Some(1));
        assert_eq!(wire.read(), Some(2));
        assert_eq!(wire.read(), None);

        let entries: Vec<_> = wire.log().entries().cloned().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, Direction::Tx);
        assert_eq!(entries[0].data, vec![0x02]);
        assert_eq!(entries[1].direction, Direction::Rx);
        assert_eq!(entries[1].data, vec![1, 2]);
    }
}
