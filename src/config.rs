//! Configuration primitives for the LIS3DH driver.

use crate::params::{FullScale, OutputDataRate, SampleMode};
use crate::registers::{
    CtrlReg1,
    CtrlReg4,
    TempCfg,
    EXPECTED_WHO_AM_I,
    REG_CTRL_REG1,
    REG_CTRL_REG2,
    REG_CTRL_REG4,
    REG_OUT_ADC3_L,
    REG_OUT_X_L,
    REG_STATUS,
    REG_TEMP_CFG,
    REG_WHO_AM_I,
};
use crate::sample::ScalePolicy;

/// Addresses of every register the driver touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// Identity register.
    pub who_am_i: u8,
    /// Data status register carrying `ZYXDA`.
    pub status: u8,
    /// Primary control register (rate, power mode, axis enables).
    pub ctrl_reg1: u8,
    /// First of the `CTRL_REG2`/`CTRL_REG3` pair written as one burst.
    pub ctrl_reg2: u8,
    /// Auxiliary ADC / temperature sensor enable register.
    pub temp_cfg: u8,
    /// Block-data-update, full-scale and resolution control register.
    pub ctrl_reg4: u8,
    /// First byte of the auxiliary ADC channel read in [`SampleMode::Adc`].
    pub adc_out: u8,
    /// First byte of the X/Y/Z output block.
    pub axes_out: u8,
}

impl RegisterMap {
    /// Returns the base register of the burst read used for `mode`.
    pub const fn data_base(&self, mode: SampleMode) -> u8 {
        match mode {
            SampleMode::Adc => self.adc_out,
            SampleMode::Normal | SampleMode::HighResolution => self.axes_out,
        }
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            who_am_i: REG_WHO_AM_I,
            status: REG_STATUS,
            ctrl_reg1: REG_CTRL_REG1,
            ctrl_reg2: REG_CTRL_REG2,
            temp_cfg: REG_TEMP_CFG,
            ctrl_reg4: REG_CTRL_REG4,
            adc_out: REG_OUT_ADC3_L,
            axes_out: REG_OUT_X_L,
        }
    }
}

/// User-facing configuration for bring-up and streaming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Register addresses used for every transaction.
    pub registers: RegisterMap,
    /// Value `WHO_AM_I` is expected to report.
    pub expected_who_am_i: u8,
    /// Channel layout and justification of streamed samples.
    pub mode: SampleMode,
    /// Conversion applied to decoded samples before framing.
    pub scale: ScalePolicy,
    /// Desired `CTRL_REG1` contents.
    pub ctrl_reg1: CtrlReg1,
    /// Desired `TEMP_CFG_REG` contents.
    pub temp_cfg: TempCfg,
    /// Desired `CTRL_REG4` contents.
    pub ctrl_reg4: CtrlReg4,
    /// Desired `CTRL_REG2`/`CTRL_REG3` contents; `None` leaves both untouched.
    pub ctrl_reg2_3: Option<[u8; 2]>,
    /// Skip the burst read unless `STATUS_REG.ZYXDA` is set.
    pub data_ready_gate: bool,
    /// Fixed delay between poll cycles when driven by `run`.
    pub poll_interval_ms: Option<u32>,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Temperature channel through the auxiliary ADC, streamed as raw counts.
    pub fn adc_temperature() -> Self {
        ConfigBuilder::new().mode(SampleMode::Adc).build()
    }

    /// Three axes in normal mode at 100 Hz, streamed as milli-g integers.
    pub fn normal() -> Self {
        ConfigBuilder::new().mode(SampleMode::Normal).build()
    }

    /// Three axes in high-resolution mode at 100 Hz, ±4 g, streamed as m/s² floats.
    pub fn high_resolution() -> Self {
        ConfigBuilder::new().mode(SampleMode::HighResolution).build()
    }

    /// Number of payload bytes carried by every output frame.
    pub const fn payload_len(&self) -> usize {
        self.mode.channel_count() * self.scale.value_width()
    }

    /// Checks whether this configuration describes a legal device state.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.ctrl_reg1.low_power() && self.ctrl_reg4.high_resolution() {
            return Err(ConfigError::LowPowerWithHighResolution);
        }

        let wants_high_resolution = matches!(self.mode, SampleMode::HighResolution);
        if self.ctrl_reg4.high_resolution() != wants_high_resolution || self.ctrl_reg1.low_power() {
            return Err(ConfigError::ResolutionMismatch);
        }

        if matches!(self.mode, SampleMode::Adc) && !self.temp_cfg.adc_enable() {
            return Err(ConfigError::AdcDisabled);
        }

        if !self.scale.is_well_formed() {
            return Err(ConfigError::ZeroScaleDivisor);
        }

        if let Some(counts) = self.mode.counts_per_g(self.ctrl_reg4.full_scale()) {
            if !self.scale.matches_counts_per_g(counts) {
                return Err(ConfigError::ScaleMismatch);
            }
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Selects the sample mode and loads its register and scale presets.
    pub fn mode(mut self, mode: SampleMode) -> Self {
        let preset = ModePreset::for_mode(mode);
        self.config.mode = mode;
        self.config.scale = preset.scale;
        self.config.ctrl_reg1 = preset.ctrl_reg1;
        self.config.temp_cfg = preset.temp_cfg;
        self.config.ctrl_reg4 = preset.ctrl_reg4;
        self.config.data_ready_gate = preset.data_ready_gate;
        self.config.poll_interval_ms = preset.poll_interval_ms;
        self
    }

    /// Overrides the output data rate in `CTRL_REG1`.
    pub fn odr(mut self, odr: OutputDataRate) -> Self {
        self.config.ctrl_reg1.set_odr(odr);
        self
    }

    /// Overrides the full-scale selection in `CTRL_REG4` and rescales the conversion to match.
    pub fn full_scale(mut self, full_scale: FullScale) -> Self {
        self.config.ctrl_reg4.set_full_scale(full_scale);
        self.rescale();
        self
    }

    /// Sets the desired `CTRL_REG1` byte verbatim.
    pub fn ctrl_reg1_raw(mut self, value: u8) -> Self {
        self.config.ctrl_reg1 = CtrlReg1::from(value);
        self
    }

    /// Sets the desired `TEMP_CFG_REG` byte verbatim.
    pub fn temp_cfg_raw(mut self, value: u8) -> Self {
        self.config.temp_cfg = TempCfg::from(value);
        self
    }

    /// Sets the desired `CTRL_REG4` byte verbatim.
    pub fn ctrl_reg4_raw(mut self, value: u8) -> Self {
        self.config.ctrl_reg4 = CtrlReg4::from(value);
        self.rescale();
        self
    }

    /// Requests a burst write of `CTRL_REG2` and `CTRL_REG3` during bring-up.
    pub fn ctrl_reg2_3(mut self, values: [u8; 2]) -> Self {
        self.config.ctrl_reg2_3 = Some(values);
        self
    }

    fn rescale(&mut self) {
        let config = &mut self.config;
        if let Some(counts) = config.mode.counts_per_g(config.ctrl_reg4.full_scale()) {
            config.scale = config.scale.with_counts_per_g(counts);
        }
    }

    /// Overrides the scale conversion.
    pub fn scale(mut self, scale: ScalePolicy) -> Self {
        self.config.scale = scale;
        self
    }

    /// Substitutes an alternate register map.
    pub fn registers(mut self, registers: RegisterMap) -> Self {
        self.config.registers = registers;
        self
    }

    /// Overrides the expected `WHO_AM_I` value.
    pub fn expected_who_am_i(mut self, value: u8) -> Self {
        self.config.expected_who_am_i = value;
        self
    }

    /// Enables or disables gating burst reads on `ZYXDA`.
    pub fn data_ready_gate(mut self, enabled: bool) -> Self {
        self.config.data_ready_gate = enabled;
        self
    }

    /// Sets the fixed delay between poll cycles; `None` polls back to back.
    pub fn poll_interval_ms(mut self, interval: Option<u32>) -> Self {
        self.config.poll_interval_ms = interval;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        let preset = ModePreset::for_mode(SampleMode::Normal);
        Self {
            registers: RegisterMap::default(),
            expected_who_am_i: EXPECTED_WHO_AM_I,
            mode: SampleMode::Normal,
            scale: preset.scale,
            ctrl_reg1: preset.ctrl_reg1,
            temp_cfg: preset.temp_cfg,
            ctrl_reg4: preset.ctrl_reg4,
            ctrl_reg2_3: None,
            data_ready_gate: preset.data_ready_gate,
            poll_interval_ms: preset.poll_interval_ms,
        }
    }
}

// Register and scale values each sample mode starts from.
struct ModePreset {
    scale: ScalePolicy,
    ctrl_reg1: CtrlReg1,
    temp_cfg: TempCfg,
    ctrl_reg4: CtrlReg4,
    data_ready_gate: bool,
    poll_interval_ms: Option<u32>,
}

impl ModePreset {
    fn for_mode(mode: SampleMode) -> Self {
        let adc_on = TempCfg::new().with_adc_enable(true).with_temp_enable(true);
        let bdu = CtrlReg4::new().with_block_data_update(true);

        match mode {
            // ZYXDA tracks the acceleration axes only, so the ADC stream is throttled by time.
            SampleMode::Adc => Self {
                scale: ScalePolicy::Unscaled,
                ctrl_reg1: CtrlReg1::all_axes(OutputDataRate::Hz50),
                temp_cfg: adc_on,
                ctrl_reg4: bdu,
                data_ready_gate: false,
                poll_interval_ms: Some(100),
            },
            SampleMode::Normal => Self {
                scale: ScalePolicy::MILLI_G,
                ctrl_reg1: CtrlReg1::all_axes(OutputDataRate::Hz100),
                temp_cfg: adc_on,
                ctrl_reg4: bdu,
                data_ready_gate: true,
                poll_interval_ms: None,
            },
            SampleMode::HighResolution => Self {
                scale: ScalePolicy::METERS_PER_SECOND_SQUARED,
                ctrl_reg1: CtrlReg1::all_axes(OutputDataRate::Hz100),
                temp_cfg: TempCfg::new(),
                ctrl_reg4: bdu.with_full_scale(FullScale::G4).with_high_resolution(true),
                data_ready_gate: true,
                poll_interval_ms: None,
            },
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `CTRL_REG1.LPen` and `CTRL_REG4.HR` are both set, which the device forbids.
    LowPowerWithHighResolution,
    /// The resolution bits do not produce the layout the sample mode decodes.
    ResolutionMismatch,
    /// ADC sampling was requested with `TEMP_CFG_REG.ADC_EN` cleared.
    AdcDisabled,
    /// A scale conversion would divide by zero.
    ZeroScaleDivisor,
    /// The scale divisor is not the count of 1 g at the configured full scale.
    ScaleMismatch,
}
