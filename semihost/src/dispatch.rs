//! Maps a recognized trap onto its handler and keeps the core running.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::console;
use crate::pixels;
use crate::target::Target;
use crate::trap::{self, TrapEvent};

/// The closed set of commands the target may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `0x04`: write a zero-terminated string to the host console.
    WriteString,
    /// `0xFF`: fill a buffer with one batch of asset pixels.
    DeliverPixels,
}

impl Command {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x04 => Some(Command::WriteString),
            0xFF => Some(Command::DeliverPixels),
            _ => None,
        }
    }
}

/// Failure of one dispatch. `E` is the probe's own error type.
#[derive(Debug, Error)]
pub enum AgentError<E: Debug> {
    #[error("target memory access failed: {0:?}")]
    Memory(E),
    #[error("resuming the target failed: {0:?}")]
    Resume(E),
    #[error("asset file: {0}")]
    Io(#[from] io::Error),
    #[error("asset exhausted: batch wants {wanted} bytes at offset {offset}, file holds {available}")]
    ShortRead {
        offset: u64,
        wanted: usize,
        available: u64,
    },
}

/// Services semihosting traps against one asset file.
pub struct SemihostAgent {
    asset_path: PathBuf,
}

impl SemihostAgent {
    pub fn new(asset_path: impl Into<PathBuf>) -> Self {
        Self {
            asset_path: asset_path.into(),
        }
    }

    /// Service one halt notification. Returns `true` if the halt was a
    /// semihosting trap (the core has been resumed by the time this
    /// returns), `false` if the halt belongs to someone else and the core
    /// was left untouched.
    pub fn on_halt<T: Target>(&self, target: &mut T) -> Result<bool, AgentError<T::Error>> {
        match trap::recognize(target).map_err(AgentError::Memory)? {
            Some(event) => self.dispatch(target, &event).map(|_| true),
            None => Ok(false),
        }
    }

    /// Run the handler for `event`, then resume the core. The resume is
    /// unconditional: an unknown command or a failing handler must not
    /// leave the target halted.
    pub fn dispatch<T: Target>(
        &self,
        target: &mut T,
        event: &TrapEvent,
    ) -> Result<(), AgentError<T::Error>> {
        let outcome = match Command::from_code(event.command) {
            Some(Command::WriteString) => {
                console::write_string(target, event.argument, &mut io::stdout())
            }
            Some(Command::DeliverPixels) => {
                pixels::deliver_pixels(target, event.argument, &self.asset_path)
            }
            None => {
                log::warn!(
                    "unknown command {:#06x} at {:#010x}",
                    event.command,
                    event.pc
                );
                Ok(())
            }
        };
        if let Err(err) = &outcome {
            log::error!("command {:#06x} failed: {err}", event.command);
        }
        target.resume().map_err(AgentError::Resume)?;
        outcome
    }
}
