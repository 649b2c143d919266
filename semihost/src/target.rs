use std::fmt::Debug;

/// Core register numbers as the debug probe reports them, ARM ordering.
pub mod reg {
    pub const R0: u8 = 0;
    pub const R1: u8 = 1;
    pub const PC: u8 = 15;
}

/// Access to a halted remote core through an attached debug probe.
///
/// Implementations decide how the requests reach the hardware; the trap
/// recognizer and the command handlers only ever talk to this trait, which
/// is what lets the whole dispatch path run against [`crate::sim::SimTarget`]
/// in tests.
///
/// `read_memory` fills the entire buffer or fails; a successful return never
/// means a partial transfer.
pub trait Target {
    type Error: Debug;

    fn read_register(&mut self, reg: u8) -> Result<u32, Self::Error>;
    fn read_memory(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
    fn write_memory(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Resume execution of the halted core.
    fn resume(&mut self) -> Result<(), Self::Error>;
}
