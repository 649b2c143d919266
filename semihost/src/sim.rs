//! In-process stand-in for a probe-attached core.
//!
//! A register file plus one flat block of RAM; no hardware behind it. The
//! demo binary and the test suite drive the dispatch path against this.

use thiserror::Error;

use crate::target::Target;

/// Default base address of simulated RAM, where Cortex-M parts map theirs.
pub const RAM_BASE: u32 = 0x2000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("unmapped access of {len} bytes at {addr:#010x}")]
    Unmapped { addr: u32, len: usize },
    #[error("no such register r{0}")]
    BadRegister(u8),
}

pub struct SimTarget {
    pub regs: [u32; 16],
    ram: Vec<u8>,
    base: u32,
    resumes: u32,
}

impl SimTarget {
    pub fn new(ram_size: usize) -> Self {
        Self::with_base(RAM_BASE, ram_size)
    }

    pub fn with_base(base: u32, ram_size: usize) -> Self {
        Self {
            regs: [0; 16],
            ram: vec![0; ram_size],
            base,
            resumes: 0,
        }
    }

    /// Place `bytes` into simulated RAM at `addr`.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) -> Result<(), SimError> {
        self.write_memory(addr, bytes)
    }

    /// How many times the core has been resumed.
    pub fn resume_count(&self) -> u32 {
        self.resumes
    }

    fn range(&self, addr: u32, len: usize) -> Result<std::ops::Range<usize>, SimError> {
        let unmapped = SimError::Unmapped { addr, len };
        let start = addr.checked_sub(self.base).ok_or(unmapped)? as usize;
        let end = start.checked_add(len).ok_or(unmapped)?;
        if end > self.ram.len() {
            return Err(unmapped);
        }
        Ok(start..end)
    }
}

impl Target for SimTarget {
    type Error = SimError;

    fn read_register(&mut self, reg: u8) -> Result<u32, SimError> {
        self.regs
            .get(reg as usize)
            .copied()
            .ok_or(SimError::BadRegister(reg))
    }

    fn read_memory(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), SimError> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.ram[range]);
        Ok(())
    }

    fn write_memory(&mut self, addr: u32, data: &[u8]) -> Result<(), SimError> {
        let range = self.range(addr, data.len())?;
        self.ram[range].copy_from_slice(data);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SimError> {
        self.resumes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_memory() {
        let mut target = SimTarget::new(0x40);
        target.write_memory(RAM_BASE + 4, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 3];
        target.read_memory(RAM_BASE + 4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn rejects_out_of_range_accesses() {
        let mut target = SimTarget::new(0x40);
        let mut buf = [0u8; 8];

        assert!(matches!(
            target.read_memory(RAM_BASE + 0x3C, &mut buf),
            Err(SimError::Unmapped { .. })
        ));
        assert!(matches!(
            target.read_memory(0x1000, &mut buf),
            Err(SimError::Unmapped { .. })
        ));
    }

    #[test]
    fn rejects_bad_register_numbers() {
        let mut target = SimTarget::new(0x40);
        assert_eq!(target.read_register(16), Err(SimError::BadRegister(16)));
    }
}
