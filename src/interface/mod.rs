//! Bus and transport abstractions consumed by the driver.

pub mod i2c;
pub mod spi;

/// Abstraction over the low-level register access required by the driver.
pub trait Lis3dhInterface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Reads `buf.len()` consecutive registers in one bus transaction.
    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Writes multiple consecutive registers in one bus transaction.
    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error>;
}

/// Byte-stream destination for encoded output frames.
///
/// Writes are fire-and-forget: the pipeline never observes backpressure or
/// delivery failures, so implementations deal with those themselves.
pub trait FrameSink {
    /// Pushes one complete buffer to the transport.
    fn write_bytes(&mut self, bytes: &[u8]);
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn write_bytes(&mut self, bytes: &[u8]) {
        (**self).write_bytes(bytes);
    }
}
