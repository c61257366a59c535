//! Software model of the I2C v1 block and a handful of slave devices.
//!
//! The bus advances one step on every register access, before the access
//! takes effect. A step is at most one of: generate START, resolve the
//! address byte, move DR into the shift register, clock one byte, or
//! generate STOP. This makes the engine's ordering observable: arming NACK
//! one access too late lets the byte through with an ACK.

extern crate std;

use core::cell::RefCell;
use std::vec::Vec;

use crate::{
    BusTiming, ClockGate, Flag, I2cRegisters, InterfaceDescriptor, PinId, Platform, Port, Status,
};

pub const PCLK1_HZ: u32 = 30_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    RepeatedStart,
    Address { address: u8, read: bool, acked: bool },
    /// Master to slave; `acked` is the slave's answer.
    Written { byte: u8, acked: bool },
    /// Slave to master; `acked` is the master's answer.
    Read { byte: u8, acked: bool },
    Stop,
}

/// Register-pointer memory in the style of a DS1307: the first byte of a
/// write sets the pointer, later bytes store and advance it, reads advance it.
#[derive(Debug, Clone)]
pub struct SimDevice {
    address: u8,
    memory: [u8; 64],
    pointer: usize,
    pointer_pending: bool,
    accepted: usize,
    write_limit: Option<usize>,
    clocked: usize,
    stall_after: Option<usize>,
    holds_address: bool,
}

impl SimDevice {
    /// Memory preloaded with its own offsets.
    pub fn counting(address: u8) -> Self {
        Self {
            address,
            memory: core::array::from_fn(|i| i as u8),
            pointer: 0,
            pointer_pending: false,
            accepted: 0,
            write_limit: None,
            clocked: 0,
            stall_after: None,
            holds_address: false,
        }
    }

    /// NACKs every data byte after the first `limit` of a write.
    pub fn accepting_writes(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Stretches SCL forever once `bytes` data bytes have been clocked, in
    /// either direction, counted from the first transaction.
    pub fn stalling_after(mut self, bytes: usize) -> Self {
        self.stall_after = Some(bytes);
        self
    }

    /// Stretches SCL forever on its own address: neither ACK nor NACK.
    pub fn holding_address(mut self) -> Self {
        self.holds_address = true;
        self
    }

    fn holds_bus(&self) -> bool {
        self.stall_after.is_some_and(|bytes| self.clocked >= bytes)
    }

    fn addressed(&mut self, read: bool) {
        if !read {
            self.pointer_pending = true;
            self.accepted = 0;
        }
    }

    fn receive(&mut self, byte: u8) -> bool {
        self.clocked += 1;
        if self.write_limit.is_some_and(|limit| self.accepted >= limit) {
            return false;
        }
        self.accepted += 1;

        if self.pointer_pending {
            self.pointer = byte as usize % self.memory.len();
            self.pointer_pending = false;
        } else {
            self.memory[self.pointer] = byte;
            self.pointer = (self.pointer + 1) % self.memory.len();
        }
        true
    }

    fn transmit(&mut self) -> u8 {
        self.clocked += 1;
        let byte = self.memory[self.pointer];
        self.pointer = (self.pointer + 1) % self.memory.len();
        byte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Idle,
    AwaitAddress,
    AddressSent(u8),
    Transmit(usize),
    Receive { device: usize, nacked: bool },
    /// The slave NACKed; the bus is held until STOP or a new START.
    Refused,
}

#[derive(Debug)]
struct State {
    enabled: bool,
    stuck: bool,
    /// A device is stretching SCL; nothing moves until power is cut.
    stalled: bool,

    start: bool,
    stop: bool,
    ack: bool,
    pos: bool,
    ack_latch: bool,

    sb: bool,
    addr: bool,
    btf: bool,
    txe: bool,
    rxne: bool,
    af: bool,
    busy: bool,

    link: Link,
    dr: Option<u8>,
    shift: Option<u8>,

    devices: Vec<SimDevice>,
    events: Vec<BusEvent>,
    timing: Option<BusTiming>,
    accesses: usize,
    status_reads: usize,
}

impl State {
    fn new(stuck: bool) -> Self {
        Self {
            enabled: false,
            stuck,
            stalled: false,
            start: false,
            stop: false,
            ack: false,
            pos: false,
            ack_latch: false,
            sb: false,
            addr: false,
            btf: false,
            txe: false,
            rxne: false,
            af: false,
            busy: stuck,
            link: Link::Idle,
            dr: None,
            shift: None,
            devices: Vec::new(),
            events: Vec::new(),
            timing: None,
            accesses: 0,
            status_reads: 0,
        }
    }

    fn step(&mut self) {
        if self.stuck || self.stalled || !self.enabled {
            return;
        }

        if self.start {
            self.start = false;
            self.events.push(if self.busy {
                BusEvent::RepeatedStart
            } else {
                BusEvent::Start
            });
            self.busy = true;
            self.sb = true;
            self.addr = false;
            self.btf = false;
            self.txe = false;
            self.rxne = false;
            self.dr = None;
            self.shift = None;
            self.link = Link::AwaitAddress;
            return;
        }

        match self.link {
            Link::Idle | Link::AwaitAddress => {}
            Link::AddressSent(byte) => self.resolve_address(byte),
            _ if self.addr => {}
            Link::Transmit(device) => self.step_transmit(device),
            Link::Receive { device, nacked } => self.step_receive(device, nacked),
            Link::Refused => {
                if self.stop {
                    self.finish();
                }
            }
        }
    }

    fn resolve_address(&mut self, byte: u8) {
        let address = byte >> 1;
        let read = byte & 1 == 1;
        let device = self.devices.iter().position(|d| d.address == address);
        if device.is_some_and(|index| self.devices[index].holds_address) {
            self.stalled = true;
            return;
        }

        self.events.push(BusEvent::Address {
            address,
            read,
            acked: device.is_some(),
        });

        match device {
            Some(index) => {
                self.devices[index].addressed(read);
                self.addr = true;
                self.ack_latch = self.ack;
                self.link = if read {
                    Link::Receive {
                        device: index,
                        nacked: false,
                    }
                } else {
                    Link::Transmit(index)
                };
            }
            None => {
                self.af = true;
                self.link = Link::Refused;
            }
        }
    }

    fn step_transmit(&mut self, device: usize) {
        if self.shift.is_some() && self.devices[device].holds_bus() {
            self.stalled = true;
        } else if let Some(byte) = self.shift.take() {
            let acked = self.devices[device].receive(byte);
            self.events.push(BusEvent::Written { byte, acked });
            if !acked {
                self.af = true;
                self.txe = false;
                self.dr = None;
                self.link = Link::Refused;
            } else if self.dr.is_none() {
                self.btf = true;
            }
        } else if let Some(byte) = self.dr.take() {
            self.shift = Some(byte);
            self.txe = true;
        } else if self.stop {
            self.finish();
        }
    }

    fn step_receive(&mut self, device: usize, nacked: bool) {
        if nacked {
            if self.stop {
                self.finish();
            }
            return;
        }
        if self.shift.is_some() {
            return;
        }
        if self.devices[device].holds_bus() {
            self.stalled = true;
            return;
        }

        let acked = if self.pos { self.ack_latch } else { self.ack };
        self.ack_latch = self.ack;

        let byte = self.devices[device].transmit();
        self.events.push(BusEvent::Read { byte, acked });

        if self.dr.is_none() {
            self.dr = Some(byte);
            self.rxne = true;
        } else {
            self.shift = Some(byte);
            self.btf = true;
        }

        self.link = Link::Receive {
            device,
            nacked: !acked,
        };
    }

    fn finish(&mut self) {
        self.events.push(BusEvent::Stop);
        self.stop = false;
        self.busy = false;
        self.sb = false;
        self.addr = false;
        self.btf = false;
        self.txe = false;
        self.link = Link::Idle;
    }
}

/// Simulated peripheral. Handles are `&SimPeripheral`.
#[derive(Debug)]
pub struct SimPeripheral {
    state: RefCell<State>,
}

impl SimPeripheral {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::new(false)),
        }
    }

    /// Hardware that never progresses: no flag ever sets, BUSY stays high and
    /// STOP is never cleared.
    pub fn stuck() -> Self {
        Self {
            state: RefCell::new(State::new(true)),
        }
    }

    pub fn with_device(self, device: SimDevice) -> Self {
        self.state.borrow_mut().devices.push(device);
        self
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.state.borrow().events.clone()
    }

    /// Master ACK (true) / NACK (false) for every byte read, in order.
    pub fn master_acks(&self) -> Vec<bool> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Read { acked, .. } => Some(*acked),
                _ => None,
            })
            .collect()
    }

    pub fn device_memory(&self, address: u8) -> [u8; 64] {
        self.state
            .borrow()
            .devices
            .iter()
            .find(|d| d.address == address)
            .map(|d| d.memory)
            .unwrap_or([0; 64])
    }

    pub fn timing(&self) -> Option<BusTiming> {
        self.state.borrow().timing
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// BUSY as seen by an observer, without advancing the bus.
    pub fn is_busy_now(&self) -> bool {
        self.state.borrow().busy
    }

    pub fn accesses(&self) -> usize {
        self.state.borrow().accesses
    }

    pub fn status_reads(&self) -> usize {
        self.state.borrow().status_reads
    }

    fn access<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.borrow_mut();
        state.accesses += 1;
        state.step();
        f(&mut state)
    }
}

impl I2cRegisters for &SimPeripheral {
    fn status(&self) -> Status {
        self.access(|s| {
            s.status_reads += 1;
            let mut status = Status::default();
            for (set, flag) in [
                (s.sb, Flag::StartBit),
                (s.addr, Flag::AddressSent),
                (s.btf, Flag::ByteTransferFinished),
                (s.rxne, Flag::RxNotEmpty),
                (s.txe, Flag::TxEmpty),
                (s.af, Flag::AckFailure),
            ] {
                if set {
                    status = status.with(flag);
                }
            }
            status
        })
    }

    fn is_busy(&self) -> bool {
        self.access(|s| s.busy)
    }

    fn stop_pending(&self) -> bool {
        self.access(|s| s.stop)
    }

    fn generate_start(&self) {
        self.access(|s| s.start = true)
    }

    fn generate_stop(&self) {
        self.access(|s| s.stop = true)
    }

    fn set_ack(&self, enabled: bool) {
        self.access(|s| s.ack = enabled)
    }

    fn set_pos(&self, enabled: bool) {
        self.access(|s| s.pos = enabled)
    }

    fn write_data(&self, byte: u8) {
        self.access(|s| match s.link {
            Link::AwaitAddress if s.sb => {
                s.sb = false;
                s.link = Link::AddressSent(byte);
            }
            Link::Transmit(_) if !s.addr => {
                s.dr = Some(byte);
                s.txe = false;
                s.btf = false;
            }
            _ => {}
        })
    }

    fn read_data(&self) -> u8 {
        self.access(|s| {
            let byte = s.dr.take().unwrap_or(0);
            s.rxne = false;
            s.btf = false;
            if let Some(next) = s.shift.take() {
                s.dr = Some(next);
                s.rxne = true;
            }
            byte
        })
    }

    fn clear_addr(&self) {
        self.access(|s| {
            if s.addr {
                s.addr = false;
                if matches!(s.link, Link::Transmit(_)) {
                    s.txe = true;
                }
            }
        })
    }

    fn clear_ack_failure(&self) {
        self.access(|s| s.af = false)
    }

    fn apply_timing(&self, timing: &BusTiming) {
        let mut state = self.state.borrow_mut();
        state.accesses += 1;
        state.timing = Some(*timing);
        state.ack = true;
        state.enabled = true;
    }

    fn disable(&self) {
        let mut state = self.state.borrow_mut();
        state.accesses += 1;
        state.enabled = false;
    }
}

/// One-interface board table wired like I2C1 on a Photon.
pub fn table(peripheral: &SimPeripheral) -> [InterfaceDescriptor<&SimPeripheral>; 1] {
    [InterfaceDescriptor {
        regs: peripheral,
        clock: ClockGate::apb1(21),
        sda: PinId::new(Port::B, 7),
        scl: PinId::new(Port::B, 6),
        af: 4,
    }]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    ClockEnabled(ClockGate),
    Reset(ClockGate),
    PinConfigured(PinId, u8),
}

#[derive(Debug, Default)]
pub struct SimPlatform {
    events: RefCell<Vec<PlatformEvent>>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlatformEvent> {
        self.events.borrow().clone()
    }
}

impl Platform for SimPlatform {
    fn input_clock_hz(&self) -> u32 {
        PCLK1_HZ
    }

    fn enable_clock(&self, gate: ClockGate) {
        self.events.borrow_mut().push(PlatformEvent::ClockEnabled(gate));
    }

    fn reset_peripheral(&self, gate: ClockGate) {
        self.events.borrow_mut().push(PlatformEvent::Reset(gate));
    }

    fn configure_bus_pin(&self, pin: PinId, af: u8) {
        self.events
            .borrow_mut()
            .push(PlatformEvent::PinConfigured(pin, af));
    }
}
