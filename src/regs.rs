/// SR1 status flags the engine waits on. Discriminants are SR1 bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Flag {
    /// SB: start condition generated.
    StartBit = 0,
    /// ADDR: address sent and acknowledged.
    AddressSent = 1,
    /// BTF: byte transfer finished, SCL stretched.
    ByteTransferFinished = 2,
    /// RxNE: data register holds a received byte.
    RxNotEmpty = 6,
    /// TxE: data register empty.
    TxEmpty = 7,
    /// AF: acknowledge failure.
    AckFailure = 10,
}

impl Flag {
    pub const fn mask(self) -> u16 {
        1 << self as u16
    }
}

/// One snapshot of SR1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u16);

impl Status {
    pub const fn has(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    pub const fn with(self, flag: Flag) -> Self {
        Status(self.0 | flag.mask())
    }
}

/// The register-level primitives the driver needs from one I2C block.
///
/// Implementors are cheap handles (the PAC block pointer, or a reference to a
/// simulated peripheral); every method is a single register access or a fixed
/// read sequence.
pub trait I2cRegisters {
    /// Reads SR1.
    fn status(&self) -> Status;

    /// SR2.BUSY.
    fn is_busy(&self) -> bool;

    /// CR1.STOP, cleared by hardware once the stop condition went out.
    fn stop_pending(&self) -> bool;

    fn generate_start(&self);

    fn generate_stop(&self);

    fn set_ack(&self, enabled: bool);

    fn set_pos(&self, enabled: bool);

    fn write_data(&self, byte: u8);

    fn read_data(&self) -> u8;

    /// Clears ADDR by reading SR1 then SR2.
    fn clear_addr(&self);

    /// Clears a latched AF without touching the other SR1 flags.
    fn clear_ack_failure(&self);

    /// Programs master mode timing with 7-bit addressing and ACK enabled, then
    /// enables the peripheral.
    fn apply_timing(&self, timing: &crate::BusTiming);

    /// Clears CR1.PE.
    fn disable(&self);
}
