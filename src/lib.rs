//! `no_std` LIS3DH bring-up and fixed-frame sample streaming.
//!
//! [`Lis3dh::configure`] drives the sensor into one of the
//! [`params::SampleMode`] presets, then a [`SamplePipeline`] polls the data
//! status flag, burst-reads the outputs and writes each scaled sample to a
//! [`FrameSink`] as `[0xA0][payload][0xC0]`.
#![cfg_attr(not(test), no_std)]

mod error;

pub mod config;
pub mod device;
pub mod frame;
pub mod interface;
mod log;
pub mod params;
pub mod pipeline;
pub mod registers;
pub mod sample;

#[cfg(test)]
mod testing;

pub use crate::config::{Config, ConfigError, RegisterMap};
pub use crate::device::{ConfigureReport, Lis3dh, PairStep, RegisterStep};
pub use crate::error::{Error, Result};
pub use crate::frame::{FrameError, OutputFrame};
pub use crate::interface::{FrameSink, Lis3dhInterface};
pub use crate::pipeline::{Cycle, PipelineStats, SamplePipeline, SkipReason};
