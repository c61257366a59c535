use crate::{Bus, BusTiming, Error, I2cRegisters, InterfaceId, Platform, Reason};

impl<'r, R, P> Bus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    /// Brings interface `id` out of reset, muxes its pins as open-drain and
    /// programs the bus for `hz`.
    ///
    /// An unusable `hz` is rejected before the clock, reset line or pins are
    /// touched, so a live interface keeps running at its old speed.
    pub fn open(&self, id: InterfaceId, hz: u32) -> Result<(), Error> {
        let descriptor = self.descriptor(id)?;
        let timing = self.timing_for(hz)?;

        self.platform.enable_clock(descriptor.clock);
        self.platform.reset_peripheral(descriptor.clock);

        self.platform.configure_bus_pin(descriptor.scl, descriptor.af);
        self.platform.configure_bus_pin(descriptor.sda, descriptor.af);

        debug!("i2c{}: open", id.0);

        self.program(id, &descriptor.regs, &timing, hz)
    }

    /// Reprograms the bus clock. Safe before or after [`Bus::open`].
    ///
    /// Speeds above [`crate::MAX_FREQUENCY`] are rejected before any register
    /// is touched. If the bus does not go idle in time the timing is still
    /// applied and the idle timeout is reported.
    pub fn set_frequency(&self, id: InterfaceId, hz: u32) -> Result<(), Error> {
        let regs = self.regs(id)?;
        let timing = self.timing_for(hz)?;
        self.program(id, &regs, &timing, hz)
    }

    fn timing_for(&self, hz: u32) -> Result<BusTiming, Error> {
        BusTiming::compute(self.platform.input_clock_hz(), hz)
            .map_err(|err| self.fail(Reason::Argument(err)))
    }

    fn program(
        &self,
        id: InterfaceId,
        regs: &R,
        timing: &BusTiming,
        hz: u32,
    ) -> Result<(), Error> {
        let idle = self.await_idle(regs);
        if idle.is_err() {
            warn!("i2c{}: bus still busy, reprogramming anyway", id.0);
        }

        regs.apply_timing(timing);
        self.record_frequency(id, hz);

        debug!("i2c{}: {} Hz (ccr {})", id.0, hz, timing.ccr);

        idle
    }

    /// Disables interface `id` once the bus is idle, or after the idle wait
    /// gives up. Pin configuration is left alone.
    pub fn close(&self, id: InterfaceId) -> Result<(), Error> {
        let regs = self.regs(id)?;

        let idle = self.await_idle(&regs);
        if idle.is_err() {
            warn!("i2c{}: bus still busy, disabling anyway", id.0);
        }

        regs.disable();
        self.record_frequency(id, 0);

        debug!("i2c{}: closed", id.0);

        idle
    }
}
