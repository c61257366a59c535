use atomic::{Atomic, Ordering};

use crate::{
    phase::{PhaseHolder, PHASE_HISTORY_SIZE},
    ArgumentError, Error, I2cRegisters, InterfaceDescriptor, InterfaceId, Phase, Platform, Reason,
    Registry, Timeouts,
};

/// Largest registry a [`Bus`] can drive.
pub const MAX_INTERFACES: usize = 4;

#[allow(clippy::declare_interior_mutable_const)]
const UNCONFIGURED: Atomic<u32> = Atomic::new(0);

/// Master-mode driver over every interface in a [`Registry`].
///
/// All operations take `&self` and run to completion on the calling thread.
/// There is no locking: callers sharing an interface between contexts must
/// serialize whole transactions themselves (see [`crate::SharedBus`]).
pub struct Bus<'r, R, P> {
    pub(crate) registry: Registry<'r, R>,
    pub(crate) platform: P,
    pub(crate) timeouts: Timeouts,
    pub(crate) phases: PhaseHolder<PHASE_HISTORY_SIZE>,
    frequencies: [Atomic<u32>; MAX_INTERFACES],
}

impl<'r, R, P> Bus<'r, R, P>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    pub const fn new(registry: Registry<'r, R>, platform: P) -> Self {
        Self::with_timeouts(
            registry,
            platform,
            Timeouts {
                flag: crate::FLAG_TIMEOUT,
                idle: crate::LONG_TIMEOUT,
            },
        )
    }

    pub const fn with_timeouts(registry: Registry<'r, R>, platform: P, timeouts: Timeouts) -> Self {
        Self {
            registry,
            platform,
            timeouts,
            phases: PhaseHolder::new(),
            frequencies: [UNCONFIGURED; MAX_INTERFACES],
        }
    }

    pub fn registry(&self) -> &Registry<'r, R> {
        &self.registry
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Phase the most recent transaction reached.
    pub fn phase(&self) -> Phase {
        self.phases.get_phase()
    }

    /// SCL frequency last applied to `id`, or `None` while it is closed.
    pub fn frequency(&self, id: InterfaceId) -> Result<Option<u32>, Error> {
        self.descriptor(id)?;
        let hz = self.frequencies[id.index()].load(Ordering::SeqCst);
        Ok((hz != 0).then_some(hz))
    }

    pub(crate) fn record_frequency(&self, id: InterfaceId, hz: u32) {
        if let Some(slot) = self.frequencies.get(id.index()) {
            slot.store(hz, Ordering::SeqCst);
        }
    }

    pub(crate) fn descriptor(&self, id: InterfaceId) -> Result<&InterfaceDescriptor<R>, Error> {
        self.registry
            .get(id)
            .ok_or_else(|| self.fail(Reason::Argument(ArgumentError::UnknownInterface)))
    }

    pub(crate) fn regs(&self, id: InterfaceId) -> Result<R, Error> {
        self.descriptor(id).map(|descriptor| descriptor.regs)
    }

    pub(crate) fn fail(&self, reason: Reason) -> Error {
        Error {
            #[cfg(feature = "dump")]
            dump: self.phases.dump(),
            reason,
        }
    }
}
