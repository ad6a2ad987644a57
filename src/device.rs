//! High-level LIS3DH device driver: bring-up and data acquisition.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::OutputFrame;
use crate::interface::i2c::I2cInterface;
use crate::interface::spi::SpiInterface;
use crate::interface::Lis3dhInterface;
use crate::log;
use crate::registers::Status;
use crate::sample::{MAX_CHANNELS, RawSample, ScaledSample};
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

// Largest burst the sample modes issue (three axes, two bytes each).
const MAX_BURST_BYTES: usize = MAX_CHANNELS * 2;

/// High-level synchronous driver for the LIS3DH accelerometer.
pub struct Lis3dh<IFACE> {
    interface: IFACE,
    config: Config,
}

/// Outcome of one bring-up step that writes a register and reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterStep {
    /// Value the configuration asked for.
    pub desired: u8,
    /// Whether a write transaction was issued.
    pub written: bool,
    /// Whether the write transaction failed.
    pub write_failed: bool,
    /// Value read back afterwards, `None` when the read failed.
    pub readback: Option<u8>,
}

impl RegisterStep {
    fn new(desired: u8) -> Self {
        Self {
            desired,
            written: false,
            write_failed: false,
            readback: None,
        }
    }

    /// Returns `true` when the read-back confirms the desired value.
    pub fn verified(&self) -> bool {
        self.readback == Some(self.desired)
    }
}

/// Outcome of the burst read / burst write / burst read-back of a register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PairStep {
    /// Values the configuration asked for.
    pub desired: [u8; 2],
    /// Contents before the write, `None` when the read failed.
    pub before: Option<[u8; 2]>,
    /// Whether the burst write failed.
    pub write_failed: bool,
    /// Values read back afterwards, `None` when the read failed.
    pub readback: Option<[u8; 2]>,
}

impl PairStep {
    /// Returns `true` when the read-back confirms both desired values.
    pub fn verified(&self) -> bool {
        self.readback == Some(self.desired)
    }
}

/// Per-step record of a best-effort [`Lis3dh::configure`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigureReport {
    /// `WHO_AM_I` as read, `None` when the read failed.
    pub who_am_i: Option<u8>,
    /// Whether `WHO_AM_I` matched the expected identity.
    pub identity_matched: bool,
    /// `STATUS_REG` snapshot taken during bring-up, `None` when the read failed.
    pub status: Option<u8>,
    /// `CTRL_REG1` before any write, `None` when the read failed.
    pub ctrl_reg1_before: Option<u8>,
    /// Operating-mode register step.
    pub ctrl_reg1: RegisterStep,
    /// Auxiliary ADC / temperature enable step.
    pub temp_cfg: RegisterStep,
    /// Block-data-update / resolution step.
    pub ctrl_reg4: RegisterStep,
    /// `CTRL_REG2`/`CTRL_REG3` burst step, when requested.
    pub ctrl_reg2_3: Option<PairStep>,
    /// Number of bus transactions that failed.
    pub bus_errors: u8,
}

impl ConfigureReport {
    /// Returns `true` when every written register read back as requested.
    pub fn is_verified(&self) -> bool {
        self.ctrl_reg1.verified()
            && self.temp_cfg.verified()
            && self.ctrl_reg4.verified()
            && self.ctrl_reg2_3.is_none_or(|step| step.verified())
    }
}

impl<IFACE> Lis3dh<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self { interface, config }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<I2C> Lis3dh<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I²C transports at the default address.
    pub fn new_i2c(i2c: I2C, config: Config) -> Self {
        Self::new(I2cInterface::new(i2c), config)
    }

    /// Releases the driver, returning the I²C bus and configuration.
    pub fn release_i2c(self) -> (I2C, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<SPI> Lis3dh<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Lis3dh<IFACE>
where
    IFACE: Lis3dhInterface<Error = CommE>,
{
    // ==================================================================
    // == Bring-up ======================================================
    // ==================================================================
    /// Drives the sensor from power-on state into the configured mode.
    ///
    /// Every bus step is attempted even when an earlier one failed; failures
    /// are logged and counted in the returned report. Only an invalid
    /// configuration aborts the sequence, before any bus traffic.
    ///
    /// Block data update in `CTRL_REG4` is set before any burst read of a
    /// register pair. The optional `CTRL_REG2`/`CTRL_REG3` step runs last.
    pub fn configure(&mut self) -> Result<ConfigureReport, CommE> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        let registers = self.config.registers;
        let mut report = ConfigureReport {
            who_am_i: None,
            identity_matched: false,
            status: None,
            ctrl_reg1_before: None,
            ctrl_reg1: RegisterStep::new(self.config.ctrl_reg1.into()),
            temp_cfg: RegisterStep::new(self.config.temp_cfg.into()),
            ctrl_reg4: RegisterStep::new(self.config.ctrl_reg4.into()),
            ctrl_reg2_3: None,
            bus_errors: 0,
        };

        match self.who_am_i() {
            Ok(id) => {
                report.who_am_i = Some(id);
                report.identity_matched = id == self.config.expected_who_am_i;
                if report.identity_matched {
                    log::info!("WHO_AM_I: {=u8:#x}", id);
                } else {
                    log::warn!(
                        "WHO_AM_I: {=u8:#x} [expected {=u8:#x}], continuing",
                        id,
                        self.config.expected_who_am_i
                    );
                }
            }
            Err(_) => {
                report.bus_errors = report.bus_errors.saturating_add(1);
                log::error!("bus error reading WHO_AM_I");
            }
        }

        match self.interface.read_register(registers.status) {
            Ok(status) => {
                report.status = Some(status);
                log::debug!("STATUS_REG: {=u8:#x}", status);
            }
            Err(_) => {
                report.bus_errors = report.bus_errors.saturating_add(1);
                log::error!("bus error reading STATUS_REG");
            }
        }

        match self.interface.read_register(registers.ctrl_reg1) {
            Ok(current) => {
                report.ctrl_reg1_before = Some(current);
                log::debug!("CTRL_REG1: {=u8:#x}", current);
            }
            Err(_) => {
                report.bus_errors = report.bus_errors.saturating_add(1);
                log::error!("bus error reading CTRL_REG1");
            }
        }

        // Unknown contents are treated as different so the write still happens.
        let step = &mut report.ctrl_reg1;
        if report.ctrl_reg1_before != Some(step.desired) {
            Self::write_step(&mut self.interface, registers.ctrl_reg1, step, &mut report.bus_errors);
        } else {
            log::debug!("CTRL_REG1 already {=u8:#x}, write skipped", step.desired);
        }
        Self::readback_step(&mut self.interface, registers.ctrl_reg1, step, &mut report.bus_errors);

        let step = &mut report.temp_cfg;
        Self::write_step(&mut self.interface, registers.temp_cfg, step, &mut report.bus_errors);
        Self::readback_step(&mut self.interface, registers.temp_cfg, step, &mut report.bus_errors);

        let step = &mut report.ctrl_reg4;
        Self::write_step(&mut self.interface, registers.ctrl_reg4, step, &mut report.bus_errors);
        Self::readback_step(&mut self.interface, registers.ctrl_reg4, step, &mut report.bus_errors);

        if let Some(desired) = self.config.ctrl_reg2_3 {
            let step = Self::pair_step(&mut self.interface, registers.ctrl_reg2, desired, &mut report.bus_errors);
            report.ctrl_reg2_3 = Some(step);
        }

        if report.is_verified() {
            log::info!("configuration applied");
        } else {
            log::warn!("configuration incomplete, {=u8} bus errors", report.bus_errors);
        }

        Ok(report)
    }

    fn write_step(interface: &mut IFACE, register: u8, step: &mut RegisterStep, errors: &mut u8) {
        step.written = true;
        match interface.write_register(register, step.desired) {
            Ok(()) => log::debug!("reg {=u8:#x} written as {=u8:#x}", register, step.desired),
            Err(_) => {
                step.write_failed = true;
                *errors = errors.saturating_add(1);
                log::error!("bus error writing reg {=u8:#x}", register);
            }
        }
    }

    fn readback_step(interface: &mut IFACE, register: u8, step: &mut RegisterStep, errors: &mut u8) {
        match interface.read_register(register) {
            Ok(value) => {
                step.readback = Some(value);
                if value == step.desired {
                    log::debug!("reg {=u8:#x} reads back {=u8:#x}", register, value);
                } else {
                    log::warn!(
                        "reg {=u8:#x} reads back {=u8:#x} [wanted {=u8:#x}]",
                        register,
                        value,
                        step.desired
                    );
                }
            }
            Err(_) => {
                *errors = errors.saturating_add(1);
                log::error!("bus error reading back reg {=u8:#x}", register);
            }
        }
    }

    fn pair_step(interface: &mut IFACE, register: u8, desired: [u8; 2], errors: &mut u8) -> PairStep {
        let mut step = PairStep {
            desired,
            before: None,
            write_failed: false,
            readback: None,
        };

        let mut current = [0u8; 2];
        match interface.read_many(register, &mut current) {
            Ok(()) => {
                step.before = Some(current);
                log::debug!("reg {=u8:#x} pair: {=u8:#x} {=u8:#x}", register, current[0], current[1]);
            }
            Err(_) => {
                *errors = errors.saturating_add(1);
                log::error!("bus error reading reg {=u8:#x} pair", register);
            }
        }

        if interface.write_many(register, &desired).is_err() {
            step.write_failed = true;
            *errors = errors.saturating_add(1);
            log::error!("bus error writing reg {=u8:#x} pair", register);
        }

        let mut readback = [0u8; 2];
        match interface.read_many(register, &mut readback) {
            Ok(()) => {
                step.readback = Some(readback);
                if step.verified() {
                    log::debug!("reg {=u8:#x} pair reads back as written", register);
                } else {
                    log::warn!(
                        "reg {=u8:#x} pair reads back {=u8:#x} {=u8:#x}",
                        register,
                        readback[0],
                        readback[1]
                    );
                }
            }
            Err(_) => {
                *errors = errors.saturating_add(1);
                log::error!("bus error reading back reg {=u8:#x} pair", register);
            }
        }

        step
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads `buf.len()` consecutive registers starting at `register` in one burst.
    pub fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), CommE> {
        self.interface.read_many(register, buf).map_err(Error::from)
    }

    /// Writes `data` to consecutive registers starting at `register` in one burst.
    pub fn write_registers(&mut self, register: u8, data: &[u8]) -> Result<(), CommE> {
        self.interface.write_many(register, data).map_err(Error::from)
    }

    // ==================================================================
    // == Identification & Status =======================================
    // ==================================================================
    /// Reads the identity register.
    pub fn who_am_i(&mut self) -> Result<u8, CommE> {
        self
            .interface
            .read_register(self.config.registers.who_am_i)
            .map_err(Error::from)
    }

    /// Reads and decodes `STATUS_REG`.
    pub fn read_status(&mut self) -> Result<Status, CommE> {
        let raw = self
            .interface
            .read_register(self.config.registers.status)
            .map_err(Error::from)?;
        Ok(Status::from(raw))
    }

    /// Returns `true` when a new X/Y/Z data set is latched (`ZYXDA`).
    pub fn data_ready(&mut self) -> Result<bool, CommE> {
        Ok(self.read_status()?.zyxda())
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Burst-reads the configured channels and right-justifies them.
    pub fn read_raw(&mut self) -> Result<RawSample, CommE> {
        let mode = self.config.mode;
        let mut raw = [0u8; MAX_BURST_BYTES];
        let burst = &mut raw[..mode.burst_len()];
        self
            .interface
            .read_many(self.config.registers.data_base(mode), burst)
            .map_err(Error::from)?;

        Ok(RawSample::decode(mode, burst))
    }

    /// Reads one burst and applies the configured scale conversion.
    pub fn read_scaled(&mut self) -> Result<ScaledSample, CommE> {
        Ok(self.read_raw()?.scale(&self.config.scale))
    }

    /// Reads one burst and packs it into an output frame.
    pub fn read_frame(&mut self) -> Result<OutputFrame, CommE> {
        let sample = self.read_scaled()?;
        OutputFrame::from_sample(&sample).map_err(Error::Frame)
    }
}
