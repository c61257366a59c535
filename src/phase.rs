use core::cell::{Ref, RefCell};

use atomic::{Atomic, Ordering};
use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

use crate::Phase;

pub const PHASE_HISTORY_SIZE: usize = 8;

#[cfg(feature = "dump")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseDump {
    pub phase_history: [Phase; PHASE_HISTORY_SIZE],
    pub current_phase: Phase,
}

/// Tracks which transaction phase the engine is in. Purely diagnostic: the
/// engine never branches on it.
pub struct PhaseHolder<const HISTORY_SIZE: usize> {
    history: Mutex<RefCell<Deque<Phase, HISTORY_SIZE>>>,
    phase: Atomic<Phase>,
}

impl<const HISTORY_SIZE: usize> PhaseHolder<HISTORY_SIZE> {
    pub const fn new() -> Self {
        Self {
            history: Mutex::new(RefCell::new(Deque::new())),
            phase: Atomic::new(Phase::Idle),
        }
    }

    pub fn set_phase(&self, phase: Phase) {
        if self.get_phase() != phase {
            self.add_phase_in_history(phase);
        }
        self.phase.store(phase, Ordering::SeqCst);
    }

    pub fn get_phase(&self) -> Phase {
        self.phase.load(Ordering::SeqCst)
    }

    pub fn get_history<'cs>(
        &'cs self,
        cs: CriticalSection<'cs>,
    ) -> Ref<'cs, Deque<Phase, HISTORY_SIZE>> {
        self.history.borrow_ref(cs)
    }

    fn add_phase_in_history(&self, phase: Phase) {
        critical_section::with(|cs| {
            let mut h = self.history.borrow_ref_mut(cs);
            if h.is_full() {
                h.pop_front();
            }
            // Cannot fail: a slot was just freed.
            let _ = h.push_back(phase);
        });
    }
}

#[cfg(feature = "dump")]
fn deque_into_array<T: Copy, const N: usize>(d: &Deque<T, N>, arr: &mut [T; N]) {
    let n = d.len();
    let (a, b) = d.as_slices();
    let s = N - n;

    arr[s..s + a.len()].copy_from_slice(a);
    arr[s + a.len()..].copy_from_slice(b);
}

#[cfg(feature = "dump")]
impl PhaseHolder<PHASE_HISTORY_SIZE> {
    pub fn dump(&self) -> PhaseDump {
        let mut phases = [Phase::Idle; PHASE_HISTORY_SIZE];

        critical_section::with(|cs| {
            let history = self.get_history(cs);
            deque_into_array(&history, &mut phases);
        });

        PhaseDump {
            phase_history: phases,
            current_phase: self.get_phase(),
        }
    }
}
