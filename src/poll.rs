/// Per-flag wait budget, in poll iterations.
pub const FLAG_TIMEOUT: u32 = 0x1000;

/// Bus-idle wait budget. A previous transaction may still be draining.
pub const LONG_TIMEOUT: u32 = 0x8000;

/// Iteration budgets for the bounded waits. Wall-clock duration depends on the
/// core clock; these only guarantee that no wait is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    pub flag: u32,
    pub idle: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            flag: FLAG_TIMEOUT,
            idle: LONG_TIMEOUT,
        }
    }
}

/// Polls `probe` at most `budget` times (at least once), returning its first
/// `Some`.
pub fn spin<T>(budget: u32, mut probe: impl FnMut() -> Option<T>) -> Option<T> {
    for _ in 0..budget.max(1) {
        if let Some(value) = probe() {
            return Some(value);
        }
        core::hint::spin_loop();
    }
    None
}

pub fn spin_until(budget: u32, mut condition: impl FnMut() -> bool) -> bool {
    spin(budget, || condition().then_some(())).is_some()
}
