use heapless::Vec;

use crate::{Error, I2cMaster, I2cRegisters, Platform};

/// Number of 7-bit addresses.
pub const ADDRESS_SPACE: usize = 0x80;

/// An address that acknowledged at least one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Responder {
    pub address: u8,
    pub read: bool,
    pub write: bool,
}

/// Probes every 7-bit address with a zero-length write and a one-byte read.
///
/// A refused probe just means nobody is there. Any other failure (a stuck
/// bus, a closed interface) ends the scan with that error.
pub fn scan_bus<R, P>(
    master: &mut I2cMaster<'_, '_, R, P>,
) -> Result<Vec<Responder, ADDRESS_SPACE>, Error>
where
    R: I2cRegisters + Copy,
    P: Platform,
{
    let mut found = Vec::new();
    let mut scratch = [0u8; 1];

    for address in 0..ADDRESS_SPACE as u8 {
        let write = probe(master.write(address, &[], true))?;
        let read = probe(master.read(address, &mut scratch, true))?;

        if read || write {
            debug!("scan: {:#x} read={} write={}", address, read, write);
            // Cannot fail: at most one entry per address.
            let _ = found.push(Responder {
                address,
                read,
                write,
            });
        }
    }

    Ok(found)
}

fn probe(result: Result<usize, Error>) -> Result<bool, Error> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if err.is_nack() => Ok(false),
        Err(err) => Err(err),
    }
}
