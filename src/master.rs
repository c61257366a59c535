use crate::{Bus, Error, I2cRegisters, InterfaceId, Platform, ResultCode};

/// Default SCL for [`I2cMaster::begin`].
pub const DEFAULT_FREQUENCY: u32 = 100_000;

/// One interface of a [`Bus`], remembering the result code of its last call.
///
/// Each method forwards to the matching [`Bus`] operation and stores the
/// signed result in [`I2cMaster::rtn`]: a byte count or zero on success, a
/// negative code on failure.
pub struct I2cMaster<'b, 'r, R, P> {
    bus: &'b Bus<'r, R, P>,
    id: InterfaceId,
    rtn: i32,
}

impl<'b, 'r, R, P> I2cMaster<'b, 'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    pub fn new(bus: &'b Bus<'r, R, P>, id: InterfaceId) -> Self {
        Self { bus, id, rtn: 0 }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn bus(&self) -> &'b Bus<'r, R, P> {
        self.bus
    }

    /// Result code of the most recent call.
    pub fn rtn(&self) -> i32 {
        self.rtn
    }

    /// Opens the interface at `hz`; `None` selects [`DEFAULT_FREQUENCY`].
    pub fn begin(&mut self, hz: Option<u32>) -> Result<(), Error> {
        let result = self.bus.open(self.id, hz.unwrap_or(DEFAULT_FREQUENCY));
        self.record(result)
    }

    pub fn end(&mut self) -> Result<(), Error> {
        let result = self.bus.close(self.id);
        self.record(result)
    }

    pub fn frequency(&mut self, hz: u32) -> Result<(), Error> {
        let result = self.bus.set_frequency(self.id, hz);
        self.record(result)
    }

    pub fn read(&mut self, address: u8, buf: &mut [u8], stop: bool) -> Result<usize, Error> {
        let result = self.bus.read(self.id, address, buf, stop);
        self.record(result)
    }

    pub fn write(&mut self, address: u8, bytes: &[u8], stop: bool) -> Result<usize, Error> {
        let result = self.bus.write(self.id, address, bytes, stop);
        self.record(result)
    }

    /// Sends one more byte on a write left open without stop.
    pub fn write_byte(&mut self, byte: u8, stop: bool) -> Result<usize, Error> {
        self.write_more(&[byte], stop)
    }

    /// Continues a write left open without stop. No START, no address.
    pub fn write_more(&mut self, bytes: &[u8], stop: bool) -> Result<usize, Error> {
        let result = self.bus.write_raw(self.id, bytes, stop);
        self.record(result)
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        let result = self.bus.generate_stop(self.id);
        self.record(result)
    }

    fn record<T>(&mut self, result: Result<T, Error>) -> Result<T, Error>
    where
        Result<T, Error>: ResultCode,
    {
        self.rtn = result.code();
        result
    }
}
