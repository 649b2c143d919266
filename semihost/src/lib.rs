//! Host-side servicing of application semihosting traps.
//!
//! A debugger-attached core executes `bkpt #0xAB` to ask the host for a
//! service: writing a string to the host console, or filling a buffer with
//! the next batch of a precomputed RGB565 pixel asset. This crate recognizes
//! the trap on a halted core, dispatches the requested command and resumes
//! execution. All target access goes through the [`target::Target`] trait so
//! the same code runs against a real probe or the bundled simulator.

pub mod console;
pub mod dispatch;
pub mod insn;
pub mod pixels;
pub mod sim;
pub mod target;
pub mod trap;

pub use dispatch::{AgentError, Command, SemihostAgent};
pub use trap::{recognize, TrapEvent};
