//! Polled, blocking master driver for the STM32 I2C v1 peripheral.
//!
//! Every transfer runs to completion on the calling thread: each protocol step
//! is a register write followed by a bounded poll on a status flag, so no call
//! can hang forever. Hardware access goes through [`I2cRegisters`] and
//! [`Platform`], which keeps the engine testable without a chip.
#![no_std]

#[macro_use]
mod fmt;

mod bus;
mod engine;
mod lifecycle;
mod master;
mod phase;
mod platform;
mod poll;
mod registry;
mod regs;
mod scan;
mod shared;
mod timing;
mod wire;

#[cfg(feature = "stm32")]
pub mod stm32;

#[cfg(test)]
mod sim;

use core::fmt::{self as core_fmt, Display, Formatter};

pub use bus::{Bus, MAX_INTERFACES};
pub use engine::ReadStrategy;
pub use master::{I2cMaster, DEFAULT_FREQUENCY};
#[cfg(feature = "dump")]
pub use phase::PhaseDump;
pub use platform::Platform;
pub use poll::{Timeouts, FLAG_TIMEOUT, LONG_TIMEOUT};
pub use registry::{
    ClockGate, ClockRegister, InterfaceDescriptor, InterfaceId, PinId, Port, Registry,
};
pub use regs::{Flag, I2cRegisters, Status};
pub use scan::{scan_bus, Responder, ADDRESS_SPACE};
pub use shared::SharedBus;
pub use timing::{BusTiming, SpeedMode, MAX_FREQUENCY};
pub use wire::{TransmitStatus, Wire, WIRE_BUFFER_LENGTH};

/// Conceptual transaction phase, overlaid on the hardware flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::NoUninit)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Phase {
    Idle,
    StartPending,
    AddressPending,
    DataPhase,
    StopPending,
}

/// Transfer direction, encoded in bit 0 of the address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    /// Address byte placed on the bus for a right-justified 7-bit `address`.
    pub const fn address_byte(self, address: u8) -> u8 {
        match self {
            Direction::Write => address << 1,
            Direction::Read => (address << 1) | 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentError {
    UnknownInterface,
    ZeroLength,
    AddressOutOfRange,
    FrequencyOutOfRange,
    InputClockOutOfRange,
}

/// The bounded wait that ran out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wait {
    Flag(Flag),
    StopCleared,
    BusIdle,
}

/// Which part of the transfer the slave refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nack {
    Address,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reason {
    Argument(ArgumentError),
    Timeout(Wait),
    AcknowledgeFailure(Nack),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error {
    #[cfg(feature = "dump")]
    pub dump: PhaseDump,
    pub reason: Reason,
}

const ARGUMENT_BASE: i32 = 10_000;
const TIMEOUT_BASE: i32 = 20_000;
const ACK_FAILURE_BASE: i32 = 30_000;

impl Reason {
    /// Negative packed code: category base plus the originating check.
    ///
    /// Callers should only test the sign; the magnitude is for diagnostics.
    pub const fn code(self) -> i32 {
        let (base, check) = match self {
            Reason::Argument(arg) => (
                ARGUMENT_BASE,
                match arg {
                    ArgumentError::UnknownInterface => 1,
                    ArgumentError::ZeroLength => 2,
                    ArgumentError::AddressOutOfRange => 3,
                    ArgumentError::FrequencyOutOfRange => 4,
                    ArgumentError::InputClockOutOfRange => 5,
                },
            ),
            Reason::Timeout(wait) => (
                TIMEOUT_BASE,
                match wait {
                    Wait::Flag(flag) => flag as i32 + 1,
                    Wait::StopCleared => 100,
                    Wait::BusIdle => 101,
                },
            ),
            Reason::AcknowledgeFailure(nack) => (
                ACK_FAILURE_BASE,
                match nack {
                    Nack::Address => 1,
                    Nack::Data => 2,
                },
            ),
        };
        -(base + check)
    }
}

impl Error {
    pub const fn code(&self) -> i32 {
        self.reason.code()
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self.reason, Reason::Timeout(_))
    }

    pub const fn is_nack(&self) -> bool {
        matches!(self.reason, Reason::AcknowledgeFailure(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core_fmt::Result {
        match self.reason {
            Reason::Argument(arg) => write!(f, "invalid argument: {:?}", arg),
            Reason::Timeout(wait) => write!(f, "timed out waiting for {:?}", wait),
            Reason::AcknowledgeFailure(nack) => write!(f, "{:?} not acknowledged", nack),
        }
    }
}

/// Collapses a driver result into the single signed result value.
pub trait ResultCode {
    fn code(&self) -> i32;
}

impl ResultCode for Result<usize, Error> {
    fn code(&self) -> i32 {
        match self {
            Ok(count) => i32::try_from(*count).unwrap_or(i32::MAX),
            Err(err) => err.code(),
        }
    }
}

impl ResultCode for Result<(), Error> {
    fn code(&self) -> i32 {
        match self {
            Ok(()) => 0,
            Err(err) => err.code(),
        }
    }
}
