//! Register map definitions for the LIS3DH accelerometer.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{FullScale, OutputDataRate, SelfTestMode};

/// Register address of `OUT_ADC3_L` (temperature channel when `TEMP_EN` is set).
pub const REG_OUT_ADC3_L: u8 = 0x0C;
/// Register address of `WHO_AM_I`.
pub const REG_WHO_AM_I: u8 = 0x0F;
/// Register address of `TEMP_CFG_REG`.
pub const REG_TEMP_CFG: u8 = 0x1F;
/// Register address of `CTRL_REG1`.
pub const REG_CTRL_REG1: u8 = 0x20;
/// Register address of `CTRL_REG2`.
pub const REG_CTRL_REG2: u8 = 0x21;
/// Register address of `CTRL_REG3`.
pub const REG_CTRL_REG3: u8 = 0x22;
/// Register address of `CTRL_REG4`.
pub const REG_CTRL_REG4: u8 = 0x23;
/// Register address of `STATUS_REG`.
pub const REG_STATUS: u8 = 0x27;
/// Register address of `OUT_X_L`.
pub const REG_OUT_X_L: u8 = 0x28;

/// Value reported by `WHO_AM_I` on a genuine LIS3DH.
pub const EXPECTED_WHO_AM_I: u8 = 0x33;

/// Default 7-bit I²C address (SA0 tied low).
pub const I2C_ADDRESS_SA0_LOW: u8 = 0x18;
/// Alternate 7-bit I²C address (SA0 tied high).
pub const I2C_ADDRESS_SA0_HIGH: u8 = 0x19;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Write-only register.
    WriteOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Raw storage backing the register payload.
    type Raw: Copy;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Optional reset/default value defined by the datasheet.
    const RESET_VALUE: Option<Self::Raw>;
}

/// Bitfield representation of `STATUS_REG` (address `0x27`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    // X-axis new data available (bit 0).
    pub xda: bool,
    // Y-axis new data available (bit 1).
    pub yda: bool,
    // Z-axis new data available (bit 2).
    pub zda: bool,
    // New X, Y, Z data set available (bit 3).
    pub zyxda: bool,
    // X-axis data overrun (bit 4).
    pub xor: bool,
    // Y-axis data overrun (bit 5).
    pub yor: bool,
    // Z-axis data overrun (bit 6).
    pub zor: bool,
    // X, Y, Z data overrun (bit 7).
    pub zyxor: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of `CTRL_REG1` (address `0x20`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg1 {
    // X-axis enable (bit 0).
    pub x_enable: bool,
    // Y-axis enable (bit 1).
    pub y_enable: bool,
    // Z-axis enable (bit 2).
    pub z_enable: bool,
    // Low-power mode enable (bit 3).
    pub low_power: bool,
    // Output data rate selection (bits 7:4).
    pub odr: OutputDataRate,
}

impl CtrlReg1 {
    /// Returns a value with all three axes enabled at the given rate.
    pub fn all_axes(odr: OutputDataRate) -> Self {
        Self::new()
            .with_x_enable(true)
            .with_y_enable(true)
            .with_z_enable(true)
            .with_odr(odr)
    }
}

impl From<u8> for CtrlReg1 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<CtrlReg1> for u8 {
    fn from(value: CtrlReg1) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of `TEMP_CFG_REG` (address `0x1F`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempCfg {
    #[skip]
    __: B6,
    // Temperature sensor routed to ADC channel 3 (bit 6).
    pub temp_enable: bool,
    // Auxiliary ADC enable (bit 7).
    pub adc_enable: bool,
}

impl From<u8> for TempCfg {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<TempCfg> for u8 {
    fn from(value: TempCfg) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of `CTRL_REG4` (address `0x23`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg4 {
    // SPI 3-wire interface selection (bit 0).
    pub spi_3wire: bool,
    // Self-test selection (bits 2:1).
    pub self_test: SelfTestMode,
    // High-resolution output enable (bit 3).
    pub high_resolution: bool,
    // Full-scale selection (bits 5:4).
    pub full_scale: FullScale,
    // Big-endian data selection (bit 6).
    pub big_endian: bool,
    // Block data update (bit 7).
    pub block_data_update: bool,
}

impl From<u8> for CtrlReg4 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<CtrlReg4> for u8 {
    fn from(value: CtrlReg4) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for Status {
    type Raw = u8;
    const ADDRESS: u8 = REG_STATUS;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
    const RESET_VALUE: Option<Self::Raw> = None;
}

impl Register for CtrlReg1 {
    type Raw = u8;
    const ADDRESS: u8 = REG_CTRL_REG1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x07);
}

impl Register for TempCfg {
    type Raw = u8;
    const ADDRESS: u8 = REG_TEMP_CFG;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

impl Register for CtrlReg4 {
    type Raw = u8;
    const ADDRESS: u8 = REG_CTRL_REG4;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates that Status bitfields match the datasheet layout.
    #[test]
    fn status_layout_matches_datasheet() {
        let status = Status::from(0b1000_1000);
        assert!(status.zyxda());
        assert!(status.zyxor());
        assert!(!status.xda());
        assert!(!status.zor());

        assert!(!Status::from(0b0000_0111).zyxda());
    }

    #[test]
    fn ctrl_reg1_normal_mode_encodings() {
        assert_eq!(u8::from(CtrlReg1::all_axes(OutputDataRate::Hz100)), 0x57);
        assert_eq!(u8::from(CtrlReg1::all_axes(OutputDataRate::Hz50)), 0x47);

        let decoded = CtrlReg1::from(0x57);
        assert_eq!(decoded.odr(), OutputDataRate::Hz100);
        assert!(!decoded.low_power());
    }

    #[test]
    fn ctrl_reg1_reset_value_has_power_down_rate() {
        let reset = CtrlReg1::from(<CtrlReg1 as Register>::RESET_VALUE.unwrap());
        assert_eq!(reset.odr(), OutputDataRate::PowerDown);
        assert!(reset.x_enable() && reset.y_enable() && reset.z_enable());
    }

    #[test]
    fn ctrl_reg1_reports_reserved_rate_bits() {
        assert!(CtrlReg1::from(0xF7).odr_or_err().is_err());
    }

    #[test]
    fn temp_cfg_enables_adc_and_temperature() {
        let cfg = TempCfg::new().with_adc_enable(true).with_temp_enable(true);
        assert_eq!(u8::from(cfg), 0xC0);
    }

    /// Ensures CTRL_REG4 encodes BDU, full scale and resolution bits as documented.
    #[test]
    fn ctrl_reg4_roundtrip() {
        let reg = CtrlReg4::new()
            .with_block_data_update(true)
            .with_full_scale(FullScale::G4)
            .with_high_resolution(true);

        assert_eq!(u8::from(reg), 0x98);
        let decoded = CtrlReg4::from(0x98);
        assert!(decoded.block_data_update());
        assert!(decoded.high_resolution());
        assert_eq!(decoded.full_scale(), FullScale::G4);
        assert_eq!(decoded.self_test(), SelfTestMode::Disabled);
    }
}
