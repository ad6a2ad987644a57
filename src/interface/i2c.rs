//! I²C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::{I2c, Operation};

use super::Lis3dhInterface;
use crate::registers::{I2C_ADDRESS_SA0_HIGH, I2C_ADDRESS_SA0_LOW};

// Sub-address MSB requests register auto-increment for multi-byte transfers.
const AUTO_INCREMENT: u8 = 0x80;

/// I²C-based interface implementation for the LIS3DH driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates an interface talking to the default address (`0x18`, SA0 low).
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, I2C_ADDRESS_SA0_LOW)
    }

    /// Creates an interface talking to the alternate address (`0x19`, SA0 high).
    pub const fn alternative(i2c: I2C) -> Self {
        Self::with_address(i2c, I2C_ADDRESS_SA0_HIGH)
    }

    /// Creates an interface with a custom 7-bit device address.
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Returns the 7-bit device address in use.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Provides mutable access to the wrapped I²C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I²C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn sub_address(register: u8, len: usize) -> u8 {
        if len > 1 {
            register | AUTO_INCREMENT
        } else {
            register
        }
    }
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    /// Probes `address` with an empty write and reports whether it acknowledged.
    pub fn is_device_connected(&mut self, address: u8) -> bool {
        self.i2c.write(address, &[]).is_ok()
    }

    /// Probes every 7-bit address and calls `on_found` for each one that answers.
    ///
    /// Returns the number of devices found.
    pub fn scan(&mut self, mut on_found: impl FnMut(u8)) -> usize {
        let mut found = 0;
        for address in 0..=0x7F {
            if self.is_device_connected(address) {
                on_found(address);
                found += 1;
            }
        }
        found
    }
}

impl<I2C> Lis3dhInterface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        let sub_address = [Self::sub_address(register, buf.len())];
        self.i2c.write_read(self.address, &sub_address, buf)
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        let sub_address = [Self::sub_address(register, data.len())];
        let mut operations = [Operation::Write(&sub_address), Operation::Write(data)];
        self.i2c.transaction(self.address, &mut operations)
    }
}

#[cfg(test)]
mod tests {
    use super::I2cInterface;
    use crate::interface::Lis3dhInterface;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn read_many_requests_auto_increment() {
        let expectations = [I2cTransaction::write_read(
            0x18,
            vec![0xA8],
            vec![0x00, 0x40, 0x00, 0x40, 0x00, 0x40],
        )];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations));

        let mut buffer = [0u8; 6];
        interface.read_many(0x28, &mut buffer).unwrap();
        assert_eq!(buffer, [0x00, 0x40, 0x00, 0x40, 0x00, 0x40]);

        interface.release().done();
    }

    #[test]
    fn read_register_uses_plain_sub_address() {
        let expectations = [I2cTransaction::write_read(0x19, vec![0x0F], vec![0x33])];
        let mut interface = I2cInterface::alternative(I2cMock::new(&expectations));

        assert_eq!(interface.read_register(0x0F).unwrap(), 0x33);

        interface.release().done();
    }

    #[test]
    fn write_register_sends_address_and_value() {
        let expectations = [I2cTransaction::write(0x18, vec![0x20, 0x57])];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations));

        interface.write_register(0x20, 0x57).unwrap();

        interface.release().done();
    }

    #[test]
    fn write_many_is_a_single_transaction() {
        let expectations = [
            I2cTransaction::transaction_start(0x18),
            I2cTransaction::write(0x18, vec![0xA1]),
            I2cTransaction::write(0x18, vec![0x50, 0x51]),
            I2cTransaction::transaction_end(0x18),
        ];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations));

        interface.write_many(0x21, &[0x50, 0x51]).unwrap();

        interface.release().done();
    }

    #[test]
    fn bus_errors_are_passed_through() {
        let expectations = [I2cTransaction::write_read(0x18, vec![0x27], vec![0x00])
            .with_error(ErrorKind::Other)];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations));

        assert_eq!(interface.read_register(0x27), Err(ErrorKind::Other));

        interface.release().done();
    }

    #[test]
    fn scan_reports_acknowledging_addresses() {
        let expectations: Vec<I2cTransaction> = (0u8..=0x7F)
            .map(|address| {
                let ack = I2cTransaction::write(address, vec![]);
                if address == 0x18 {
                    ack
                } else {
                    ack.with_error(ErrorKind::Other)
                }
            })
            .collect();
        let mut interface = I2cInterface::new(I2cMock::new(&expectations));

        let mut seen = Vec::new();
        let count = interface.scan(|address| seen.push(address));

        assert_eq!(count, 1);
        assert_eq!(seen, vec![0x18]);

        interface.release().done();
    }
}
