//! Transaction engine: START, addressing, data phase and STOP as sequences of
//! register writes and bounded flag polls.
//!
//! Each poll either sees its flag, sees AF (the slave refused), or runs out of
//! budget. On AF the latch is cleared and a STOP releases the bus before the
//! error is returned; on timeout the bus is left as the hardware reports it.

mod read;
mod write;

pub use read::ReadStrategy;

use crate::{
    poll, ArgumentError, Bus, Direction, Error, Flag, I2cRegisters, InterfaceId, Nack, Phase,
    Platform, Reason, Wait,
};

impl<'r, R, P> Bus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    /// Sends a STOP and waits for the hardware to clear it.
    pub fn generate_stop(&self, id: InterfaceId) -> Result<(), Error> {
        let regs = self.regs(id)?;
        self.send_stop(&regs)
    }

    pub(crate) fn check_address(&self, address: u8) -> Result<u8, Error> {
        if address > 0x7F {
            Err(self.fail(Reason::Argument(ArgumentError::AddressOutOfRange)))
        } else {
            Ok(address)
        }
    }

    /// START, then the address byte. Leaves ADDR set for the caller to clear,
    /// since reads must arm NACK before clearing it.
    pub(crate) fn address(&self, regs: &R, address: u8, direction: Direction) -> Result<(), Error> {
        regs.generate_start();
        self.phases.set_phase(Phase::StartPending);
        self.await_flag(regs, Flag::StartBit)?;

        regs.write_data(direction.address_byte(address));
        self.phases.set_phase(Phase::AddressPending);
        self.await_acked(regs, Flag::AddressSent, Nack::Address)
    }

    pub(crate) fn await_flag(&self, regs: &R, flag: Flag) -> Result<(), Error> {
        if poll::spin_until(self.timeouts.flag, || regs.status().has(flag)) {
            Ok(())
        } else {
            Err(self.fail(Reason::Timeout(Wait::Flag(flag))))
        }
    }

    /// Waits for `flag` while watching AF.
    pub(crate) fn await_acked(&self, regs: &R, flag: Flag, nack: Nack) -> Result<(), Error> {
        let outcome = poll::spin(self.timeouts.flag, || {
            let status = regs.status();
            if status.has(Flag::AckFailure) {
                Some(false)
            } else if status.has(flag) {
                Some(true)
            } else {
                None
            }
        });

        match outcome {
            Some(true) => Ok(()),
            Some(false) => Err(self.refused(regs, nack)),
            None => Err(self.fail(Reason::Timeout(Wait::Flag(flag)))),
        }
    }

    pub(crate) fn refused(&self, regs: &R, nack: Nack) -> Error {
        regs.clear_ack_failure();
        // The refusal is what gets reported, even if the STOP then times out.
        let _ = self.send_stop(regs);
        self.fail(Reason::AcknowledgeFailure(nack))
    }

    pub(crate) fn send_stop(&self, regs: &R) -> Result<(), Error> {
        regs.generate_stop();
        self.await_stop(regs)
    }

    pub(crate) fn await_stop(&self, regs: &R) -> Result<(), Error> {
        self.phases.set_phase(Phase::StopPending);
        if poll::spin_until(self.timeouts.flag, || !regs.stop_pending()) {
            self.phases.set_phase(Phase::Idle);
            Ok(())
        } else {
            Err(self.fail(Reason::Timeout(Wait::StopCleared)))
        }
    }

    pub(crate) fn await_idle(&self, regs: &R) -> Result<(), Error> {
        if poll::spin_until(self.timeouts.idle, || !regs.is_busy()) {
            Ok(())
        } else {
            Err(self.fail(Reason::Timeout(Wait::BusIdle)))
        }
    }
}
