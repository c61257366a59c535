use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::{Bus, I2cMaster, I2cRegisters, InterfaceId, Platform};

/// A [`Bus`] that several contexts may use, one whole transaction at a time.
///
/// The closure runs inside a critical section, so keep transactions short:
/// interrupts are masked for their full duration.
pub struct SharedBus<'r, R, P> {
    inner: Mutex<CriticalSectionRawMutex, Bus<'r, R, P>>,
}

impl<'r, R, P> SharedBus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    pub const fn new(bus: Bus<'r, R, P>) -> Self {
        Self {
            inner: Mutex::new(bus),
        }
    }

    /// Runs `f` with exclusive use of the bus.
    pub fn transaction<T>(&self, f: impl FnOnce(&Bus<'r, R, P>) -> T) -> T {
        self.inner.lock(f)
    }

    /// Runs `f` with an [`I2cMaster`] for `id`, exclusive for its duration.
    pub fn with_master<T>(
        &self,
        id: InterfaceId,
        f: impl FnOnce(&mut I2cMaster<'_, 'r, R, P>) -> T,
    ) -> T {
        self.inner.lock(|bus| f(&mut I2cMaster::new(bus, id)))
    }
}
