use crate::{Bus, Direction, Error, Flag, I2cRegisters, InterfaceId, Nack, Phase, Platform};

impl<'r, R, P> Bus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    /// Addresses `address` for writing and sends `bytes`.
    ///
    /// Without `stop` the bus stays held, so the next call continues the same
    /// transaction (a repeated START for a read, or [`Bus::write_raw`]).
    /// An empty `bytes` is a plain address probe.
    pub fn write(
        &self,
        id: InterfaceId,
        address: u8,
        bytes: &[u8],
        stop: bool,
    ) -> Result<usize, Error> {
        let regs = self.regs(id)?;
        let address = self.check_address(address)?;

        regs.set_pos(false);
        self.address(&regs, address, Direction::Write)?;
        regs.clear_addr();
        self.phases.set_phase(Phase::DataPhase);

        self.transmit(&regs, bytes, stop)
    }

    /// Sends more data on a write that is already addressed. No START.
    pub fn write_raw(&self, id: InterfaceId, bytes: &[u8], stop: bool) -> Result<usize, Error> {
        let regs = self.regs(id)?;
        self.transmit(&regs, bytes, stop)
    }

    fn transmit(&self, regs: &R, bytes: &[u8], stop: bool) -> Result<usize, Error> {
        regs.clear_ack_failure();

        let mut pending = bytes.iter().copied();
        while let Some(byte) = pending.next() {
            self.await_acked(regs, Flag::TxEmpty, Nack::Data)?;
            regs.write_data(byte);

            // Refill straight away while the shift register is still busy so
            // the two-deep transmit pipeline never runs dry.
            if regs.status().has(Flag::ByteTransferFinished) {
                if let Some(next) = pending.next() {
                    regs.write_data(next);
                }
            }
        }

        self.await_acked(regs, Flag::TxEmpty, Nack::Data)?;
        if regs.status().has(Flag::AckFailure) {
            return Err(self.refused(regs, Nack::Data));
        }

        if stop {
            self.send_stop(regs)?;
        }

        Ok(bytes.len())
    }
}
