use crate::{
    ArgumentError, Bus, Direction, Error, Flag, I2cRegisters, InterfaceId, Phase, Platform, Reason,
};

/// How the final NACK is armed, chosen by transfer length.
///
/// CR1.ACK governs the byte currently being clocked in, and the receive path
/// is two bytes deep (DR plus the shift register). The point at which ACK
/// must drop so that exactly the last byte is NACKed therefore depends on how
/// many bytes are still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadStrategy {
    /// ACK dropped (and STOP armed) while ADDR is still set.
    Single,
    /// ACK dropped with POS set while ADDR is still set, so the NACK lands on
    /// the second byte; both bytes are collected on one BTF.
    Pair,
    /// ACK kept until the last three bytes; dropped once byte N-2 sits in DR
    /// and N-1 in the shift register.
    Burst,
}

impl ReadStrategy {
    pub const fn for_len(len: usize) -> Option<Self> {
        match len {
            0 => None,
            1 => Some(ReadStrategy::Single),
            2 => Some(ReadStrategy::Pair),
            _ => Some(ReadStrategy::Burst),
        }
    }
}

impl<'r, R, P> Bus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    /// Reads `buf.len()` bytes from `address`, NACKing the last one.
    ///
    /// Issues a repeated START when the bus is still held by a previous write
    /// without stop.
    pub fn read(
        &self,
        id: InterfaceId,
        address: u8,
        buf: &mut [u8],
        stop: bool,
    ) -> Result<usize, Error> {
        let regs = self.regs(id)?;
        let Some(strategy) = ReadStrategy::for_len(buf.len()) else {
            return Err(self.fail(Reason::Argument(ArgumentError::ZeroLength)));
        };
        let address = self.check_address(address)?;

        regs.set_pos(false);
        regs.set_ack(true);
        self.address(&regs, address, Direction::Read)?;

        match strategy {
            ReadStrategy::Single => self.read_single(&regs, buf, stop)?,
            ReadStrategy::Pair => self.read_pair(&regs, buf, stop)?,
            ReadStrategy::Burst => self.read_burst(&regs, buf, stop)?,
        }

        if stop {
            self.await_stop(&regs)?;
        }

        Ok(buf.len())
    }

    fn read_single(&self, regs: &R, buf: &mut [u8], stop: bool) -> Result<(), Error> {
        regs.set_ack(false);
        if stop {
            regs.generate_stop();
        }
        regs.clear_addr();
        self.phases.set_phase(Phase::DataPhase);

        self.await_flag(regs, Flag::RxNotEmpty)?;
        buf[0] = regs.read_data();

        Ok(())
    }

    fn read_pair(&self, regs: &R, buf: &mut [u8], stop: bool) -> Result<(), Error> {
        regs.set_ack(false);
        regs.set_pos(true);
        regs.clear_addr();
        self.phases.set_phase(Phase::DataPhase);

        // Both bytes latched: first in DR, second in the shift register.
        self.await_flag(regs, Flag::ByteTransferFinished)?;
        if stop {
            regs.generate_stop();
        }
        buf[0] = regs.read_data();
        buf[1] = regs.read_data();

        Ok(())
    }

    fn read_burst(&self, regs: &R, buf: &mut [u8], stop: bool) -> Result<(), Error> {
        regs.clear_addr();
        self.phases.set_phase(Phase::DataPhase);

        let (head, tail) = buf.split_at_mut(buf.len() - 3);
        for slot in head {
            self.await_flag(regs, Flag::RxNotEmpty)?;
            *slot = regs.read_data();
        }

        // N-2 in DR, N-1 in the shift register: the next byte is the last.
        self.await_flag(regs, Flag::ByteTransferFinished)?;
        regs.set_ack(false);
        tail[0] = regs.read_data();

        self.await_flag(regs, Flag::ByteTransferFinished)?;
        if stop {
            regs.generate_stop();
        }
        tail[1] = regs.read_data();
        tail[2] = regs.read_data();

        Ok(())
    }
}
