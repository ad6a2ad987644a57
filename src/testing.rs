//! Register-file mock and recording sink shared by the unit tests.
#![allow(dead_code)]

use std::vec::Vec;

use crate::interface::{FrameSink, Lis3dhInterface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read(u8),
    Write(u8, u8),
    ReadMany(u8, usize),
    WriteMany(u8, usize),
}

#[derive(Debug, Clone)]
pub(crate) struct MockInterface {
    regs: [u8; 256],
    log: Vec<Access>,
    failing: Vec<u8>,
    fail_next: usize,
}

impl Default for MockInterface {
    fn default() -> Self {
        Self {
            regs: [0u8; 256],
            log: Vec::new(),
            failing: Vec::new(),
            fail_next: 0,
        }
    }
}

impl MockInterface {
    pub(crate) fn with_reg(mut self, reg: u8, value: u8) -> Self {
        self.set_reg(reg, value);
        self
    }

    pub(crate) fn with_regs(mut self, reg: u8, values: &[u8]) -> Self {
        for (offset, value) in values.iter().enumerate() {
            self.set_reg(reg.wrapping_add(offset as u8), *value);
        }
        self
    }

    pub(crate) fn set_reg(&mut self, reg: u8, value: u8) {
        self.regs[reg as usize] = value;
    }

    pub(crate) fn reg(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    /// Every access to `reg` fails until [`Self::clear_failures`].
    pub(crate) fn fail_register(&mut self, reg: u8) {
        self.failing.push(reg);
    }

    /// The next `count` transactions fail regardless of address.
    pub(crate) fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    pub(crate) fn clear_failures(&mut self) {
        self.failing.clear();
        self.fail_next = 0;
    }

    pub(crate) fn log(&self) -> &[Access] {
        &self.log
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }

    pub(crate) fn writes(&self) -> Vec<(u8, u8)> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(reg, value) => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn burst_reads(&self) -> Vec<(u8, usize)> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::ReadMany(reg, len) => Some((reg, len)),
                _ => None,
            })
            .collect()
    }

    fn check(&mut self, reg: u8, access: Access) -> Result<(), MockError> {
        self.log.push(access);
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(MockError);
        }
        if self.failing.contains(&reg) {
            return Err(MockError);
        }
        Ok(())
    }
}

impl Lis3dhInterface for MockInterface {
    type Error = MockError;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), MockError> {
        self.check(register, Access::Write(register, value))?;
        self.set_reg(register, value);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, MockError> {
        self.check(register, Access::Read(register))?;
        Ok(self.reg(register))
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> Result<(), MockError> {
        self.check(register, Access::ReadMany(register, buf.len()))?;
        for (offset, slot) in buf.iter_mut().enumerate() {
            *slot = self.reg(register.wrapping_add(offset as u8));
        }
        Ok(())
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> Result<(), MockError> {
        self.check(register, Access::WriteMany(register, data.len()))?;
        for (offset, value) in data.iter().enumerate() {
            self.set_reg(register.wrapping_add(offset as u8), *value);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) writes: Vec<Vec<u8>>,
}

impl FrameSink for RecordingSink {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.writes.push(bytes.to_vec());
    }
}
