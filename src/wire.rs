use heapless::Vec;

use crate::{master::DEFAULT_FREQUENCY, Error, I2cMaster, I2cRegisters, Platform};

/// Capacity of the transmit and receive buffers.
pub const WIRE_BUFFER_LENGTH: usize = 32;

/// Outcome of [`Wire::end_transmission`], numbered like the Arduino status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransmitStatus {
    Success = 0,
    /// No transmission was open, or the buffer overflowed.
    NotTransmitting = 1,
    Failed = 2,
}

/// Buffered byte-stream front end: writes are queued and sent in one
/// transfer by [`Wire::end_transmission`], reads are fetched in one transfer
/// by [`Wire::request_from`] and drained byte by byte.
pub struct Wire<'b, 'r, R, P> {
    master: I2cMaster<'b, 'r, R, P>,
    frequency: u32,
    tx_address: u8,
    tx: Vec<u8, WIRE_BUFFER_LENGTH>,
    transmitting: bool,
    rx: Vec<u8, WIRE_BUFFER_LENGTH>,
    rx_index: usize,
}

impl<'b, 'r, R, P> Wire<'b, 'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    pub fn new(master: I2cMaster<'b, 'r, R, P>) -> Self {
        Self {
            master,
            frequency: DEFAULT_FREQUENCY,
            tx_address: 0,
            tx: Vec::new(),
            transmitting: false,
            rx: Vec::new(),
            rx_index: 0,
        }
    }

    pub fn master(&self) -> &I2cMaster<'b, 'r, R, P> {
        &self.master
    }

    /// Drops any buffered data and opens the interface at the last
    /// [`Wire::set_clock`] frequency.
    pub fn begin(&mut self) -> Result<(), Error> {
        self.tx.clear();
        self.rx.clear();
        self.rx_index = 0;
        self.transmitting = false;
        self.master.begin(Some(self.frequency))
    }

    pub fn end(&mut self) -> Result<(), Error> {
        self.master.end()
    }

    pub fn set_clock(&mut self, hz: u32) -> Result<(), Error> {
        self.frequency = hz;
        self.master.frequency(hz)
    }

    pub fn begin_transmission(&mut self, address: u8) {
        self.tx_address = address;
        self.tx.clear();
        self.transmitting = true;
    }

    /// Queues one byte. Returns 0 and abandons the transmission if none is
    /// open or the buffer is full.
    pub fn write(&mut self, byte: u8) -> usize {
        if self.transmitting && self.tx.push(byte).is_ok() {
            return 1;
        }
        self.transmitting = false;
        0
    }

    /// Queues bytes until the first one that does not fit.
    pub fn write_all(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().take_while(|&&byte| self.write(byte) == 1).count()
    }

    /// Sends the queued bytes as one write transfer.
    pub fn end_transmission(&mut self, stop: bool) -> TransmitStatus {
        let status = if !self.transmitting {
            TransmitStatus::NotTransmitting
        } else {
            match self.master.write(self.tx_address, &self.tx, stop) {
                Ok(_) => TransmitStatus::Success,
                Err(_err) => {
                    debug!("wire: write to {:#x} failed: {}", self.tx_address, _err);
                    TransmitStatus::Failed
                }
            }
        };

        self.tx.clear();
        self.transmitting = false;
        status
    }

    /// Reads up to [`WIRE_BUFFER_LENGTH`] bytes from `address` into the
    /// receive buffer. Returns how many are available, 0 on failure.
    pub fn request_from(&mut self, address: u8, quantity: usize, stop: bool) -> usize {
        if quantity > WIRE_BUFFER_LENGTH {
            warn!(
                "wire: request for {} bytes clamped to {}",
                quantity,
                WIRE_BUFFER_LENGTH
            );
        }
        let quantity = quantity.min(WIRE_BUFFER_LENGTH);

        self.rx.clear();
        self.rx_index = 0;
        // Cannot fail: quantity is clamped to capacity.
        let _ = self.rx.resize_default(quantity);

        if self.master.read(address, &mut self.rx, stop).is_err() {
            self.rx.clear();
        }
        self.rx.len()
    }

    pub fn available(&self) -> usize {
        self.rx.len() - self.rx_index
    }

    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.rx_index += 1;
        Some(byte)
    }

    pub fn peek(&self) -> Option<u8> {
        self.rx.get(self.rx_index).copied()
    }

    /// Transfers complete synchronously, so there is never anything queued
    /// outside an open transmission.
    pub fn flush(&mut self) {}
}
