use crate::ArgumentError;

/// Fastest SCL the peripheral supports.
pub const MAX_FREQUENCY: u32 = 400_000;

const STANDARD_MODE_MAX: u32 = 100_000;
const MIN_INPUT_MHZ: u32 = 2;
const MAX_INPUT_MHZ: u32 = 50;
const CCR_MASK: u32 = 0x0FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    Standard,
    /// Fast mode, duty cycle Tlow/Thigh = 2.
    Fast,
}

/// Values for CR2.FREQ, CCR and TRISE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    pub freq_mhz: u8,
    pub ccr: u16,
    pub mode: SpeedMode,
    pub trise: u8,
}

impl BusTiming {
    pub fn compute(input_hz: u32, scl_hz: u32) -> Result<Self, ArgumentError> {
        if scl_hz == 0 || scl_hz > MAX_FREQUENCY {
            return Err(ArgumentError::FrequencyOutOfRange);
        }

        let freq_mhz = input_hz / 1_000_000;
        if !(MIN_INPUT_MHZ..=MAX_INPUT_MHZ).contains(&freq_mhz) {
            return Err(ArgumentError::InputClockOutOfRange);
        }

        let (ccr, mode, trise) = if scl_hz <= STANDARD_MODE_MAX {
            let ccr = (input_hz / (scl_hz * 2)).max(4);
            (ccr, SpeedMode::Standard, freq_mhz + 1)
        } else {
            let mut ccr = input_hz / (scl_hz * 3);
            if ccr & CCR_MASK == 0 {
                ccr |= 1;
            }
            (ccr, SpeedMode::Fast, freq_mhz * 300 / 1000 + 1)
        };

        if ccr > CCR_MASK {
            return Err(ArgumentError::FrequencyOutOfRange);
        }

        Ok(Self {
            freq_mhz: freq_mhz as u8,
            ccr: ccr as u16,
            mode,
            trise: trise as u8,
        })
    }
}
