use crate::{ClockGate, PinId};

/// Chip-level services the lifecycle needs around an I2C block: clock gating,
/// peripheral reset and pin muxing.
pub trait Platform {
    /// Clock feeding the I2C block (PCLK1 on STM32F2/F4), in Hz.
    fn input_clock_hz(&self) -> u32;

    fn enable_clock(&self, gate: ClockGate);

    /// Pulses the peripheral's reset line, leaving it enabled-but-idle.
    fn reset_peripheral(&self, gate: ClockGate);

    /// Switches `pin` to open-drain alternate function `af`.
    fn configure_bus_pin(&self, pin: PinId, af: u8);
}
