//! Strongly typed parameter enumerations for the LIS3DH driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the register bitfields. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use lis3dh_stream::params::{FullScale, OutputDataRate, SampleMode};
//!
//! let odr = OutputDataRate::Hz100;
//! let fs = FullScale::G4;
//! let mode = SampleMode::HighResolution;
//! assert_eq!(mode.justification_shift(), 4);
//! let _ = (odr, fs);
//! ```

use modular_bitfield::prelude::Specifier;

/// Output data rate selections (`CTRL_REG1.ODR[3:0]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum OutputDataRate {
    /// Power-down mode.
    PowerDown = 0b0000,
    /// 1 Hz.
    Hz1 = 0b0001,
    /// 10 Hz.
    Hz10 = 0b0010,
    /// 25 Hz.
    Hz25 = 0b0011,
    /// 50 Hz.
    Hz50 = 0b0100,
    /// 100 Hz.
    Hz100 = 0b0101,
    /// 200 Hz.
    Hz200 = 0b0110,
    /// 400 Hz.
    Hz400 = 0b0111,
    /// 1.6 kHz, low-power mode only.
    LowPower1600Hz = 0b1000,
    /// 1.344 kHz in normal/high-resolution, 5.376 kHz in low-power mode.
    Hz1344 = 0b1001,
}

impl OutputDataRate {
    /// Returns the ODR in hertz for normal and high-resolution modes.
    pub const fn hz(self) -> u32 {
        match self {
            Self::PowerDown => 0,
            Self::Hz1 => 1,
            Self::Hz10 => 10,
            Self::Hz25 => 25,
            Self::Hz50 => 50,
            Self::Hz100 => 100,
            Self::Hz200 => 200,
            Self::Hz400 => 400,
            Self::LowPower1600Hz => 1_600,
            Self::Hz1344 => 1_344,
        }
    }
}

/// Full-scale selection (`CTRL_REG4.FS[1:0]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum FullScale {
    /// ±2 g.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}

impl FullScale {
    /// Returns the positive full-scale bound in g.
    pub const fn g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }
}

/// Self-test selection (`CTRL_REG4.ST[1:0]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum SelfTestMode {
    /// Normal operation.
    Disabled = 0b00,
    /// Self test 0.
    Test0 = 0b01,
    /// Self test 1.
    Test1 = 0b10,
}

/// Data source and layout streamed by the sample pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleMode {
    /// Auxiliary ADC channel 3 (temperature sensor), 10-bit left-justified.
    Adc,
    /// Three acceleration axes in normal mode, 10-bit left-justified.
    Normal,
    /// Three acceleration axes in high-resolution mode.
    HighResolution,
}

impl SampleMode {
    /// Number of two-byte channels captured per burst read.
    pub const fn channel_count(self) -> usize {
        match self {
            Self::Adc => 1,
            Self::Normal | Self::HighResolution => 3,
        }
    }

    /// Number of consecutive registers captured per burst read.
    pub const fn burst_len(self) -> usize {
        self.channel_count() * 2
    }

    /// Arithmetic right shift discarding the unused low-order bits.
    pub const fn justification_shift(self) -> u32 {
        match self {
            Self::Adc | Self::Normal => 6,
            Self::HighResolution => 4,
        }
    }
    /// Right-justified counts corresponding to 1 g at `full_scale`.
    ///
    /// Returns `None` for the ADC channel, which carries no acceleration.
    pub const fn counts_per_g(self, full_scale: FullScale) -> Option<u16> {
        // Half of the signed code range (10 or 12 bits) spans the full-scale bound.
        let half_range = match self {
            Self::Adc => return None,
            Self::Normal => 512,
            Self::HighResolution => 2048,
        };
        Some(half_range / full_scale.g() as u16)
    }
}
