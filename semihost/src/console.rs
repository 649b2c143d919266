//! Host console output on behalf of the target.

use std::io::Write;

use crate::dispatch::AgentError;
use crate::target::Target;

/// Upper bound on the terminator scan. A target that never terminates its
/// string must not drag the host into an unbounded memory walk.
pub const MAX_STRING_LEN: u32 = 4096;

/// Read the zero-terminated string at `addr` from target memory and write it
/// to `out`, flushing immediately; the target may reuse the buffer as soon
/// as it resumes. Strings longer than [`MAX_STRING_LEN`] are truncated with
/// a warning.
pub fn write_string<T: Target>(
    target: &mut T,
    addr: u32,
    out: &mut impl Write,
) -> Result<(), AgentError<T::Error>> {
    let mut collected = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        target
            .read_memory(addr.wrapping_add(collected.len() as u32), &mut byte)
            .map_err(AgentError::Memory)?;
        if byte[0] == 0 {
            break;
        }
        collected.push(byte[0]);
        if collected.len() >= MAX_STRING_LEN as usize {
            log::warn!("string at {addr:#010x} unterminated after {MAX_STRING_LEN} bytes, truncating");
            break;
        }
    }

    out.write_all(String::from_utf8_lossy(&collected).as_bytes())?;
    out.flush()?;
    Ok(())
}
