/// Logical bus interface selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceId(pub u8);

impl InterfaceId {
    pub const INTERFACE1: InterfaceId = InterfaceId(0);
    pub const INTERFACE2: InterfaceId = InterfaceId(1);
    pub const INTERFACE3: InterfaceId = InterfaceId(2);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRegister {
    Apb1,
    Apb2,
}

/// Peripheral clock-enable location. The same bit selects the reset line in
/// the matching reset register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockGate {
    pub register: ClockRegister,
    pub bit: u8,
}

impl ClockGate {
    pub const fn apb1(bit: u8) -> Self {
        Self {
            register: ClockRegister::Apb1,
            bit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    pub port: Port,
    pub pin: u8,
}

impl PinId {
    pub const fn new(port: Port, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Everything needed to bring up one physical interface.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceDescriptor<R> {
    pub regs: R,
    pub clock: ClockGate,
    pub sda: PinId,
    pub scl: PinId,
    /// Alternate-function number routing the pins to the peripheral.
    pub af: u8,
}

/// Read-only table of the interfaces a board exposes.
pub struct Registry<'a, R> {
    interfaces: &'a [InterfaceDescriptor<R>],
}

impl<'a, R> Registry<'a, R> {
    pub const fn new(interfaces: &'a [InterfaceDescriptor<R>]) -> Self {
        assert!(
            interfaces.len() <= crate::MAX_INTERFACES,
            "Too many interfaces in one registry."
        );

        Self { interfaces }
    }

    pub const fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn get(&self, id: InterfaceId) -> Option<&InterfaceDescriptor<R>> {
        self.interfaces.get(id.index())
    }
}
