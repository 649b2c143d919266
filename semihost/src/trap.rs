//! Recognition of the application trap on a halted core.

use crate::insn::{self, Insn};
use crate::target::{reg, Target};

/// Immediate operand that marks a `bkpt` as a semihosting request.
pub const SEMIHOST_IMM: u8 = 0xAB;

/// Everything dispatch needs to know about one recognized trap, captured
/// while the core is halted and discarded once it resumes.
#[derive(Debug, Clone, Copy)]
pub struct TrapEvent {
    pub pc: u32,
    pub insn: Insn,
    /// Command code from `r0`.
    pub command: u32,
    /// Argument address from `r1`.
    pub argument: u32,
}

/// Inspect a halted core and decide whether it stopped on the semihosting
/// trap. A halt for any other reason (user breakpoint, fault, a `bkpt` with
/// a foreign immediate) yields `None` and leaves the core untouched.
///
/// Reads registers and the single faulting opcode; never writes and never
/// resumes.
pub fn recognize<T: Target>(target: &mut T) -> Result<Option<TrapEvent>, T::Error> {
    let pc = target.read_register(reg::PC)?;
    let mut opcode = [0u8; 2];
    target.read_memory(pc, &mut opcode)?;
    let insn = insn::decode(u16::from_le_bytes(opcode));

    let Insn::Bkpt(imm) = insn else {
        log::trace!("halt at {pc:#010x} on `{insn}`, not a trap");
        return Ok(None);
    };
    if imm != SEMIHOST_IMM {
        log::trace!("bkpt {imm:#04x} at {pc:#010x} is someone else's breakpoint");
        return Ok(None);
    }

    let command = target.read_register(reg::R0)?;
    let argument = target.read_register(reg::R1)?;
    log::trace!("trap at {pc:#010x}: command {command:#06x}, argument {argument:#010x}");

    Ok(Some(TrapEvent {
        pc,
        insn,
        command,
        argument,
    }))
}
