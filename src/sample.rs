//! Raw sample assembly, justification and unit conversion.
//!
//! Output registers hold left-justified two's complement values: the low byte
//! sits at the lower address and the unused resolution bits occupy the bottom
//! of the 16-bit container. Decoding is therefore `low | high << 8` followed by
//! a sign-extending right shift whose width depends on the sample mode.

use crate::params::SampleMode;

/// Maximum number of channels captured in one burst.
pub const MAX_CHANNELS: usize = 3;

/// Assembles a signed 16-bit value from two adjacent output registers.
#[inline]
pub const fn assemble(low: u8, high: u8) -> i16 {
    i16::from_le_bytes([low, high])
}

/// Right-justifies a left-justified sample with a sign-extending shift.
#[inline]
pub const fn justify(raw: i16, shift: u32) -> i16 {
    raw >> shift
}

/// Assembles and right-justifies one register pair.
#[inline]
pub const fn decode(low: u8, high: u8, shift: u32) -> i16 {
    justify(assemble(low, high), shift)
}

/// Conversion applied to right-justified counts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScalePolicy {
    /// Counts are forwarded untouched as 16-bit integers.
    Unscaled,
    /// `counts * numerator / denominator` in integer arithmetic, saturated to 16 bits.
    FixedPoint {
        /// Scale numerator.
        numerator: i32,
        /// Scale denominator.
        denominator: i32,
    },
    /// `counts * gravity / half_scale_range` as a 32-bit float.
    Float {
        /// Physical value of one g.
        gravity: f32,
        /// Counts corresponding to one g.
        half_scale_range: f32,
    },
}

impl ScalePolicy {
    /// Milli-g at 256 counts per g.
    pub const MILLI_G: Self = Self::FixedPoint {
        numerator: 1000,
        denominator: 256,
    };

    /// Metres per second squared at 512 counts per g.
    pub const METERS_PER_SECOND_SQUARED: Self = Self::Float {
        gravity: 9.81,
        half_scale_range: 512.0,
    };

    /// Width in bytes of one encoded value.
    pub const fn value_width(&self) -> usize {
        match self {
            Self::Unscaled | Self::FixedPoint { .. } => 2,
            Self::Float { .. } => 4,
        }
    }

    /// Returns `false` when the policy would divide by zero.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Self::Unscaled => true,
            Self::FixedPoint { denominator, .. } => denominator != 0,
            Self::Float {
                half_scale_range, ..
            } => half_scale_range != 0.0,
        }
    }

    /// Replaces the divisor with `counts` per g, keeping the numerator or gravity.
    pub const fn with_counts_per_g(self, counts: u16) -> Self {
        match self {
            Self::Unscaled => Self::Unscaled,
            Self::FixedPoint { numerator, .. } => Self::FixedPoint {
                numerator,
                denominator: counts as i32,
            },
            Self::Float { gravity, .. } => Self::Float {
                gravity,
                half_scale_range: counts as f32,
            },
        }
    }

    /// Returns `true` when the divisor equals `counts` per g, or there is no divisor.
    pub fn matches_counts_per_g(&self, counts: u16) -> bool {
        match *self {
            Self::Unscaled => true,
            Self::FixedPoint { denominator, .. } => denominator == i32::from(counts),
            Self::Float {
                half_scale_range, ..
            } => half_scale_range == f32::from(counts),
        }
    }

    /// Converts right-justified counts into a physical sample.
    pub fn apply(&self, counts: i16) -> PhysicalSample {
        match *self {
            Self::Unscaled => PhysicalSample::Counts(counts),
            Self::FixedPoint {
                numerator,
                denominator,
            } => {
                let scaled = (counts as i64 * numerator as i64)
                    .checked_div(denominator as i64)
                    .unwrap_or(0)
                    .clamp(i16::MIN as i64, i16::MAX as i64);
                PhysicalSample::Scaled(scaled as i16)
            }
            Self::Float {
                gravity,
                half_scale_range,
            } => PhysicalSample::Float(counts as f32 * gravity / half_scale_range),
        }
    }
}

/// A decoded, unit-converted measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhysicalSample {
    /// Unscaled counts (temperature channel).
    Counts(i16),
    /// Fixed-point scaled value, typically milli-g.
    Scaled(i16),
    /// Floating-point value, typically m/s².
    Float(f32),
}

impl PhysicalSample {
    /// Width in bytes of the little-endian encoding.
    pub const fn width(&self) -> usize {
        match self {
            Self::Counts(_) | Self::Scaled(_) => 2,
            Self::Float(_) => 4,
        }
    }

    /// Writes the little-endian encoding into `out` and returns the bytes used.
    ///
    /// Returns `None` when `out` is too short.
    pub fn write_le(&self, out: &mut [u8]) -> Option<usize> {
        let width = self.width();
        let slot = out.get_mut(..width)?;
        match *self {
            Self::Counts(value) | Self::Scaled(value) => slot.copy_from_slice(&value.to_le_bytes()),
            Self::Float(value) => slot.copy_from_slice(&value.to_le_bytes()),
        }
        Some(width)
    }

    /// Reads one value encoded under `policy` from the start of `bytes`.
    pub fn read_le(policy: &ScalePolicy, bytes: &[u8]) -> Option<Self> {
        match policy {
            ScalePolicy::Unscaled => Some(Self::Counts(i16::from_le_bytes(two(bytes)?))),
            ScalePolicy::FixedPoint { .. } => Some(Self::Scaled(i16::from_le_bytes(two(bytes)?))),
            ScalePolicy::Float { .. } => {
                let four: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
                Some(Self::Float(f32::from_le_bytes(four)))
            }
        }
    }
}

fn two(bytes: &[u8]) -> Option<[u8; 2]> {
    bytes.get(..2)?.try_into().ok()
}

/// Right-justified counts of one burst, in X, Y, Z (or single channel) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    counts: [i16; MAX_CHANNELS],
    len: usize,
}

impl RawSample {
    /// Decodes a burst of register bytes captured in `mode`.
    ///
    /// Trailing bytes beyond the mode's burst length are ignored; a short
    /// buffer yields only the complete pairs it contains.
    pub fn decode(mode: SampleMode, bytes: &[u8]) -> Self {
        let shift = mode.justification_shift();
        let mut counts = [0i16; MAX_CHANNELS];
        let mut len = 0;

        for (slot, pair) in counts
            .iter_mut()
            .zip(bytes.chunks_exact(2))
            .take(mode.channel_count())
        {
            *slot = decode(pair[0], pair[1], shift);
            len += 1;
        }

        Self { counts, len }
    }

    /// Returns the decoded channels.
    pub fn counts(&self) -> &[i16] {
        &self.counts[..self.len]
    }

    /// Applies `policy` to every channel.
    pub fn scale(&self, policy: &ScalePolicy) -> ScaledSample {
        let mut values = [PhysicalSample::Counts(0); MAX_CHANNELS];
        for (value, counts) in values.iter_mut().zip(self.counts()) {
            *value = policy.apply(*counts);
        }
        ScaledSample {
            values,
            len: self.len,
        }
    }
}

/// Unit-converted channels of one burst.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScaledSample {
    values: [PhysicalSample; MAX_CHANNELS],
    len: usize,
}

impl ScaledSample {
    /// Returns the converted channels.
    pub fn values(&self) -> &[PhysicalSample] {
        &self.values[..self.len]
    }
}
