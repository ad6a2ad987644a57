//! Fixed-length output frames streamed to the host.
//!
//! Wire format: `[0xA0][payload][0xC0]`. The payload holds every channel in
//! X, Y, Z (or single channel) order, each value little-endian: 2 bytes for
//! integer policies, 4 bytes for float. There is no escaping and no checksum;
//! the host resynchronises on the fixed frame length alone.

use crate::sample::{MAX_CHANNELS, PhysicalSample, ScalePolicy, ScaledSample};

/// First byte of every frame.
pub const FRAME_HEADER: u8 = 0xA0;
/// Last byte of every frame.
pub const FRAME_FOOTER: u8 = 0xC0;
/// Largest payload any sample mode produces.
pub const MAX_PAYLOAD_LEN: usize = MAX_CHANNELS * 4;
/// Largest complete frame.
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD_LEN + 2;

/// Reasons a frame could not be built or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// No values were supplied.
    Empty,
    /// Values of different widths cannot share a frame.
    MixedWidths,
    /// The payload does not fit in [`MAX_PAYLOAD_LEN`].
    PayloadTooLong,
    /// The buffer does not start with [`FRAME_HEADER`] or end with [`FRAME_FOOTER`].
    BadSentinel,
    /// The payload length is not a multiple of the value width.
    BadLength,
}

/// One complete wire frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OutputFrame {
    buf: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl OutputFrame {
    /// Packs `values` between the sentinels.
    ///
    /// Either the whole frame is produced or an error is returned; a partial
    /// frame never exists.
    pub fn encode(values: &[PhysicalSample]) -> Result<Self, FrameError> {
        let width = values.first().ok_or(FrameError::Empty)?.width();
        if values.iter().any(|value| value.width() != width) {
            return Err(FrameError::MixedWidths);
        }

        let payload_len = width * values.len();
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong);
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        buf[0] = FRAME_HEADER;
        let mut cursor = 1;
        for value in values {
            cursor += value
                .write_le(&mut buf[cursor..=payload_len])
                .ok_or(FrameError::PayloadTooLong)?;
        }
        buf[cursor] = FRAME_FOOTER;

        Ok(Self {
            buf,
            len: cursor + 1,
        })
    }

    /// Packs one scaled burst.
    pub fn from_sample(sample: &ScaledSample) -> Result<Self, FrameError> {
        Self::encode(sample.values())
    }

    /// Validates a received buffer and copies it into a frame.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        let (&first, rest) = bytes.split_first().ok_or(FrameError::BadSentinel)?;
        let (&last, payload) = rest.split_last().ok_or(FrameError::BadSentinel)?;
        if first != FRAME_HEADER || last != FRAME_FOOTER {
            return Err(FrameError::BadSentinel);
        }
        if payload.is_empty() || payload.len() % 2 != 0 {
            return Err(FrameError::BadLength);
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong);
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            buf,
            len: bytes.len(),
        })
    }

    /// Returns the complete frame, sentinels included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Returns the bytes between the sentinels.
    pub fn payload(&self) -> &[u8] {
        &self.buf[1..self.len - 1]
    }

    /// Total frame length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Frames always carry both sentinels, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decodes the payload back into values encoded under `policy`.
    pub fn values(&self, policy: &ScalePolicy) -> Result<ValueIter<'_>, FrameError> {
        let width = policy.value_width();
        if self.payload().len() % width != 0 {
            return Err(FrameError::BadLength);
        }
        Ok(ValueIter {
            chunks: self.payload().chunks_exact(width),
            policy: *policy,
        })
    }
}

impl core::ops::Deref for OutputFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for OutputFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("OutputFrame").field(&self.as_bytes()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "OutputFrame({=[u8]:#x})", self.as_bytes());
    }
}

/// Iterator over the values of a frame payload.
pub struct ValueIter<'a> {
    chunks: core::slice::ChunksExact<'a, u8>,
    policy: ScalePolicy,
}

impl Iterator for ValueIter<'_> {
    type Item = PhysicalSample;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        PhysicalSample::read_le(&self.policy, chunk)
    }
}
