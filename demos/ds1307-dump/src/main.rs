#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;
use stm32_polled_i2c_master::{
    scan_bus,
    stm32::{Stm32Platform, PHOTON},
    Bus, I2cMaster, InterfaceId, Registry, TransmitStatus, Wire,
};

const DS1307_ADDRESS: u8 = 0x68;

/// First battery-backed RAM register; 0..8 hold the clock.
const DS1307_RAM: u8 = 0x08;
const DS1307_RAM_LEN: usize = 56;

/// The default config runs APB1 straight from the 16 MHz HSI.
const PCLK1_HZ: u32 = 16_000_000;

#[entry]
fn main() -> ! {
    defmt::info!("Start!");

    let _peripherals = embassy_stm32::init(Default::default());

    let bus = Bus::new(Registry::new(&PHOTON), Stm32Platform::new(PCLK1_HZ));
    let mut i2c = I2cMaster::new(&bus, InterfaceId::INTERFACE1);

    if let Err(err) = i2c.begin(None) {
        defmt::error!("begin failed: {}", err);
    }

    match scan_bus(&mut i2c) {
        Ok(found) if found.is_empty() => defmt::info!("No devices found."),
        Ok(found) => {
            for device in found {
                defmt::info!(
                    "Device at {=u8:#x}: read {}, write {}",
                    device.address,
                    device.read,
                    device.write
                );
            }
        }
        Err(err) => defmt::error!("scan failed: {}", err),
    }

    // Fill the RAM one byte at a time on a single open write.
    let fill = i2c
        .write(DS1307_ADDRESS, &[DS1307_RAM], false)
        .and_then(|_| {
            for value in DS1307_RAM..DS1307_RAM + DS1307_RAM_LEN as u8 {
                i2c.write_byte(value, false)?;
            }
            i2c.stop()
        });
    if let Err(err) = fill {
        defmt::error!("RAM fill failed: {} (rtn {})", err, i2c.rtn());
    }

    let mut registers = [0u8; 64];
    match i2c
        .write(DS1307_ADDRESS, &[0x00], false)
        .and_then(|_| i2c.read(DS1307_ADDRESS, &mut registers, true))
    {
        Ok(_) => {
            for row in registers.chunks(8) {
                defmt::info!("{=[u8]:x}", row);
            }
        }
        Err(err) => defmt::error!("dump failed: {}", err),
    }

    if let Err(err) = i2c.end() {
        defmt::warn!("end failed: {}", err);
    }

    let mut wire = Wire::new(i2c);
    if let Err(err) = wire.begin() {
        defmt::error!("Wire begin failed: {}", err);
    }
    wire.begin_transmission(DS1307_ADDRESS);
    wire.write(0x00);
    if wire.end_transmission(true) == TransmitStatus::Success {
        let n = wire.request_from(DS1307_ADDRESS, 32, true);
        defmt::info!("Wire read {} bytes", n);
        while let Some(byte) = wire.read() {
            defmt::info!("{=u8:#x}", byte);
        }
    } else {
        defmt::error!("Wire write failed");
    }
    let _ = wire.end();

    loop {
        cortex_m::asm::wfi();
    }
}
