//! Register bindings for STM32F2/F4 parts with the v1 I2C block, through the
//! PAC re-exported by `embassy-stm32`.

use embassy_stm32::pac::{
    self,
    gpio::{vals as gpio_vals, Gpio},
    i2c::{vals, I2c},
};

use crate::{
    BusTiming, ClockGate, ClockRegister, I2cRegisters, InterfaceDescriptor, PinId, Platform, Port,
    SpeedMode, Status,
};

/// Handle to one I2C register block.
#[derive(Clone, Copy)]
pub struct Stm32I2c(pub I2c);

impl I2cRegisters for Stm32I2c {
    fn status(&self) -> Status {
        Status(self.0.sr1().read().0 as u16)
    }

    fn is_busy(&self) -> bool {
        self.0.sr2().read().busy()
    }

    fn stop_pending(&self) -> bool {
        self.0.cr1().read().stop()
    }

    fn generate_start(&self) {
        self.0.cr1().modify(|w| w.set_start(true));
    }

    fn generate_stop(&self) {
        self.0.cr1().modify(|w| w.set_stop(true));
    }

    fn set_ack(&self, enabled: bool) {
        self.0.cr1().modify(|w| w.set_ack(enabled));
    }

    fn set_pos(&self, enabled: bool) {
        self.0.cr1().modify(|w| w.set_pos(enabled));
    }

    fn write_data(&self, byte: u8) {
        self.0.dr().write(|w| w.set_dr(byte));
    }

    fn read_data(&self) -> u8 {
        self.0.dr().read().dr()
    }

    fn clear_addr(&self) {
        let _ = self.0.sr1().read();
        let _ = self.0.sr2().read();
    }

    fn clear_ack_failure(&self) {
        self.0.sr1().modify(|w| w.set_af(false));
    }

    fn apply_timing(&self, timing: &BusTiming) {
        let regs = self.0;

        regs.cr1().modify(|w| w.set_pe(false));

        regs.cr2().modify(|w| w.set_freq(timing.freq_mhz));
        regs.oar1().modify(|w| w.set_addmode(vals::Addmode::BIT7));
        regs.ccr().modify(|w| {
            w.set_ccr(timing.ccr);
            w.set_duty(vals::Duty::DUTY2_1);
            w.set_f_s(match timing.mode {
                SpeedMode::Standard => vals::FS::STANDARD,
                SpeedMode::Fast => vals::FS::FAST,
            });
        });
        regs.trise().modify(|w| w.set_trise(timing.trise));

        regs.cr1().modify(|w| {
            w.set_ack(true);
            w.set_pe(true);
        });
    }

    fn disable(&self) {
        self.0.cr1().modify(|w| w.set_pe(false));
    }
}

/// Clock tree, reset lines and GPIO muxing of the running chip.
///
/// Works from the plain [`ClockGate`]/[`PinId`] values in a board table, so
/// it writes RCC and GPIO directly instead of going through the HAL's typed
/// pin and peripheral singletons.
pub struct Stm32Platform {
    pclk1_hz: u32,
}

impl Stm32Platform {
    /// `pclk1_hz` is the APB1 clock the RCC setup produced.
    pub const fn new(pclk1_hz: u32) -> Self {
        Self { pclk1_hz }
    }
}

fn port_block(port: Port) -> (Gpio, u8) {
    match port {
        Port::A => (pac::GPIOA, 0),
        Port::B => (pac::GPIOB, 1),
        Port::C => (pac::GPIOC, 2),
        Port::D => (pac::GPIOD, 3),
        Port::E => (pac::GPIOE, 4),
    }
}

impl Platform for Stm32Platform {
    fn input_clock_hz(&self) -> u32 {
        self.pclk1_hz
    }

    fn enable_clock(&self, gate: ClockGate) {
        let mask = 1u32 << gate.bit;
        match gate.register {
            ClockRegister::Apb1 => pac::RCC.apb1enr().modify(|w| w.0 |= mask),
            ClockRegister::Apb2 => pac::RCC.apb2enr().modify(|w| w.0 |= mask),
        }
    }

    fn reset_peripheral(&self, gate: ClockGate) {
        let mask = 1u32 << gate.bit;
        match gate.register {
            ClockRegister::Apb1 => {
                pac::RCC.apb1rstr().modify(|w| w.0 |= mask);
                pac::RCC.apb1rstr().modify(|w| w.0 &= !mask);
            }
            ClockRegister::Apb2 => {
                pac::RCC.apb2rstr().modify(|w| w.0 |= mask);
                pac::RCC.apb2rstr().modify(|w| w.0 &= !mask);
            }
        }
    }

    fn configure_bus_pin(&self, pin: PinId, af: u8) {
        let (gpio, enable_bit) = port_block(pin.port);
        let n = pin.pin as usize;

        pac::RCC.ahb1enr().modify(|w| w.0 |= 1 << enable_bit);

        gpio.afr(n / 8).modify(|w| w.set_afr(n % 8, af));
        gpio.otyper().modify(|w| w.set_ot(n, gpio_vals::Ot::OPENDRAIN));
        gpio.pupdr().modify(|w| w.set_pupdr(n, gpio_vals::Pupdr::FLOATING));
        gpio.ospeedr()
            .modify(|w| w.set_ospeedr(n, gpio_vals::Ospeedr::LOWSPEED));
        gpio.moder().modify(|w| w.set_moder(n, gpio_vals::Moder::ALTERNATE));
    }
}

/// I2C1 enable bit in RCC_APB1ENR.
pub const I2C1_CLOCK: ClockGate = ClockGate::apb1(21);

/// AF4 routes PB6..PB9 to I2C1.
pub const AF_I2C1: u8 = 4;

/// Photon: one interface, SDA on D0 (PB7) and SCL on D1 (PB6).
pub const PHOTON: [InterfaceDescriptor<Stm32I2c>; 1] = [InterfaceDescriptor {
    regs: Stm32I2c(pac::I2C1),
    clock: I2C1_CLOCK,
    sda: PinId::new(Port::B, 7),
    scl: PinId::new(Port::B, 6),
    af: AF_I2C1,
}];

/// Electron: the Photon pins plus I2C1 remapped to C4 (PB9, SDA) and C5
/// (PB8, SCL). Both entries drive the same block, so only one may be open.
pub const ELECTRON: [InterfaceDescriptor<Stm32I2c>; 2] = [
    PHOTON[0],
    InterfaceDescriptor {
        regs: Stm32I2c(pac::I2C1),
        clock: I2C1_CLOCK,
        sda: PinId::new(Port::B, 9),
        scl: PinId::new(Port::B, 8),
        af: AF_I2C1,
    },
];
