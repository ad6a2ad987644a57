//! Polling loop that turns fresh sensor data into output frames.
//!
//! One call to [`SamplePipeline::poll_once`] is one cycle:
//! status poll, burst read, decode, scale, emit. The status read always
//! precedes the burst read so stale or half-latched data is never framed.
//! Bus faults cost exactly the current cycle; the next call starts over.

use embedded_hal::delay::DelayNs;

use crate::device::{ConfigureReport, Lis3dh};
use crate::error::{Error, Result};
use crate::frame::OutputFrame;
use crate::interface::{FrameSink, Lis3dhInterface};
use crate::log;

/// Where a cycle was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// Reading `STATUS_REG` failed.
    StatusRead,
    /// The burst read of the output registers failed.
    BurstRead,
    /// The decoded values could not be packed into a frame.
    Encoding,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cycle {
    /// `ZYXDA` was clear; nothing was read or emitted.
    NotReady,
    /// A frame was written to the sink.
    Emitted(OutputFrame),
    /// The cycle was dropped; no frame was written.
    Skipped(SkipReason),
}

/// Running counters kept across cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    /// Cycles executed.
    pub cycles: u32,
    /// Frames handed to the sink.
    pub frames: u32,
    /// Cycles that found no new data.
    pub not_ready: u32,
    /// Cycles dropped because of a fault.
    pub skipped: u32,
}

/// Sample pipeline bound to a configured device and a frame sink.
pub struct SamplePipeline<IFACE, SINK> {
    device: Lis3dh<IFACE>,
    sink: SINK,
    stats: PipelineStats,
}

impl<IFACE, SINK> SamplePipeline<IFACE, SINK> {
    /// Wraps an already configured device.
    pub fn new(device: Lis3dh<IFACE>, sink: SINK) -> Self {
        Self {
            device,
            sink,
            stats: PipelineStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Provides mutable access to the device.
    pub fn device_mut(&mut self) -> &mut Lis3dh<IFACE> {
        &mut self.device
    }

    /// Provides mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut SINK {
        &mut self.sink
    }

    /// Consumes the pipeline and returns its parts.
    pub fn release(self) -> (Lis3dh<IFACE>, SINK) {
        (self.device, self.sink)
    }
}

impl<IFACE, SINK, CommE> SamplePipeline<IFACE, SINK>
where
    IFACE: Lis3dhInterface<Error = CommE>,
    SINK: FrameSink,
{
    /// Runs the configurator once, then returns a pipeline ready to poll.
    pub fn bring_up(mut device: Lis3dh<IFACE>, sink: SINK) -> Result<(Self, ConfigureReport), CommE> {
        let report = device.configure()?;
        Ok((Self::new(device, sink), report))
    }

    /// Executes a single poll cycle.
    pub fn poll_once(&mut self) -> Cycle {
        let cycle = self.cycle();
        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        match cycle {
            Cycle::NotReady => self.stats.not_ready = self.stats.not_ready.wrapping_add(1),
            Cycle::Emitted(_) => self.stats.frames = self.stats.frames.wrapping_add(1),
            Cycle::Skipped(_) => self.stats.skipped = self.stats.skipped.wrapping_add(1),
        }
        cycle
    }

    fn cycle(&mut self) -> Cycle {
        if self.device.config().data_ready_gate {
            match self.device.data_ready() {
                Ok(true) => {}
                Ok(false) => return Cycle::NotReady,
                Err(_) => {
                    log::warn!("status read failed, cycle skipped");
                    return Cycle::Skipped(SkipReason::StatusRead);
                }
            }
        }

        let frame = match self.device.read_frame() {
            Ok(frame) => frame,
            Err(Error::Frame(err)) => {
                log::error!("frame dropped: {}", err);
                return Cycle::Skipped(SkipReason::Encoding);
            }
            Err(_) => {
                log::warn!("burst read failed, cycle skipped");
                return Cycle::Skipped(SkipReason::BurstRead);
            }
        };

        log::trace!("emit {}", frame);
        self.sink.write_bytes(frame.as_bytes());
        Cycle::Emitted(frame)
    }

    /// Polls forever, sleeping the configured interval between cycles.
    pub fn run(&mut self, delay: &mut impl DelayNs) -> ! {
        let interval = self.device.config().poll_interval_ms;
        loop {
            self.poll_once();
            if let Some(ms) = interval {
                delay.delay_ms(ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::frame::{FRAME_FOOTER, FRAME_HEADER};
    use crate::registers::{REG_STATUS, REG_WHO_AM_I};
    use crate::sample::{PhysicalSample, ScalePolicy};
    use crate::testing::{MockInterface, RecordingSink};

    const ZYXDA: u8 = 0x08;

    fn pipeline(mock: MockInterface, config: Config) -> SamplePipeline<MockInterface, RecordingSink> {
        SamplePipeline::new(Lis3dh::new(mock, config), RecordingSink::default())
    }

    #[test]
    fn temperature_scenario() {
        let mock = MockInterface::default().with_regs(0x0C, &[0x00, 0x02]);
        let mut pipe = pipeline(mock, Config::adc_temperature());

        let cycle = pipe.poll_once();

        assert!(matches!(cycle, Cycle::Emitted(_)));
        assert_eq!(pipe.sink_mut().writes, vec![vec![0xA0, 0x08, 0x00, 0xC0]]);
        assert!(pipe.device_mut().interface_mut().log().iter().all(|access| {
            !matches!(access, crate::testing::Access::Read(REG_STATUS))
        }));
    }

    #[test]
    fn normal_mode_scenario() {
        let mock = MockInterface::default()
            .with_reg(REG_STATUS, ZYXDA)
            .with_regs(0x28, &[0x00, 0x40, 0x00, 0x40, 0x00, 0x40]);
        let mut pipe = pipeline(mock, Config::normal());

        pipe.poll_once();

        // +1 g on every axis: 0x4000 >> 6 = 256 counts = 1000 mg = 0x03E8.
        assert_eq!(
            pipe.sink_mut().writes,
            vec![vec![0xA0, 0xE8, 0x03, 0xE8, 0x03, 0xE8, 0x03, 0xC0]]
        );
    }

    #[test]
    fn negative_normal_mode_values() {
        let mock = MockInterface::default()
            .with_reg(REG_STATUS, ZYXDA)
            .with_regs(0x28, &[0x00, 0xC0, 0x00, 0xC0, 0x00, 0xC0]);
        let mut pipe = pipeline(mock, Config::normal());

        let Cycle::Emitted(frame) = pipe.poll_once() else {
            panic!("expected a frame");
        };

        let values: Vec<_> = frame.values(&ScalePolicy::MILLI_G).unwrap().collect();
        assert_eq!(values, vec![PhysicalSample::Scaled(-1000); 3]);
    }

    #[test]
    fn high_resolution_scenario() {
        let mock = MockInterface::default()
            .with_reg(REG_STATUS, ZYXDA)
            .with_regs(0x28, &[0x00, 0x20, 0x00, 0x20, 0x00, 0x20]);
        let mut pipe = pipeline(mock, Config::high_resolution());

        pipe.poll_once();

        let frame = &pipe.sink_mut().writes[0];
        assert_eq!(frame.len(), 14);
        assert_eq!(frame[0], FRAME_HEADER);
        assert_eq!(frame[13], FRAME_FOOTER);
        for axis in frame[1..13].chunks_exact(4) {
            assert_eq!(axis, &9.81f32.to_le_bytes());
        }
    }

    #[test]
    fn clear_status_flag_skips_burst_and_emission() {
        let mock = MockInterface::default()
            .with_reg(REG_STATUS, 0x07)
            .with_regs(0x28, &[0x00, 0x40, 0x00, 0x40, 0x00, 0x40]);
        let mut pipe = pipeline(mock, Config::normal());

        assert_eq!(pipe.poll_once(), Cycle::NotReady);
        assert!(pipe.device_mut().interface_mut().burst_reads().is_empty());
        assert!(pipe.sink_mut().writes.is_empty());
    }

    #[test]
    fn status_precedes_burst_every_cycle() {
        let mock = MockInterface::default().with_reg(REG_STATUS, ZYXDA);
        let mut pipe = pipeline(mock, Config::normal());

        pipe.poll_once();
        pipe.poll_once();

        use crate::testing::Access;
        assert_eq!(
            pipe.device_mut().interface_mut().log(),
            &[
                Access::Read(REG_STATUS),
                Access::ReadMany(0x28, 6),
                Access::Read(REG_STATUS),
                Access::ReadMany(0x28, 6),
            ]
        );
    }

    #[test]
    fn bus_faults_skip_one_cycle_only() {
        let mock = MockInterface::default()
            .with_reg(REG_STATUS, ZYXDA)
            .with_regs(0x28, &[0x00, 0x40, 0x00, 0x40, 0x00, 0x40]);
        let mut pipe = pipeline(mock, Config::normal());

        pipe.device_mut().interface_mut().fail_next(1);
        assert_eq!(pipe.poll_once(), Cycle::Skipped(SkipReason::StatusRead));

        pipe.device_mut().interface_mut().fail_register(0x28);
        assert_eq!(pipe.poll_once(), Cycle::Skipped(SkipReason::BurstRead));

        pipe.device_mut().interface_mut().clear_failures();
        assert!(matches!(pipe.poll_once(), Cycle::Emitted(_)));

        assert_eq!(pipe.sink_mut().writes.len(), 1);
        assert_eq!(
            pipe.stats(),
            PipelineStats {
                cycles: 3,
                frames: 1,
                not_ready: 0,
                skipped: 2,
            }
        );
    }

    #[test]
    fn bring_up_configures_then_streams() {
        let mock = MockInterface::default()
            .with_reg(REG_WHO_AM_I, 0x33)
            .with_reg(REG_STATUS, ZYXDA)
            .with_regs(0x28, &[0x00, 0x20, 0x00, 0x20, 0x00, 0x20]);
        let device = Lis3dh::new(mock, Config::high_resolution());

        let (mut pipe, report) = SamplePipeline::bring_up(device, RecordingSink::default()).unwrap();

        assert!(report.is_verified());
        assert!(matches!(pipe.poll_once(), Cycle::Emitted(_)));
    }

    #[test]
    fn sink_can_be_borrowed() {
        let mock = MockInterface::default().with_regs(0x0C, &[0x40, 0x00]);
        let mut sink = RecordingSink::default();
        {
            let mut pipe = SamplePipeline::new(Lis3dh::new(mock, Config::adc_temperature()), &mut sink);
            pipe.poll_once();
            pipe.poll_once();
        }
        assert_eq!(sink.writes, vec![vec![0xA0, 0x01, 0x00, 0xC0]; 2]);
    }
}
