//! Streaming of the precomputed pixel asset into target memory.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::dispatch::AgentError;
use crate::target::Target;

/// Bytes per packed RGB565 pixel in the asset file.
pub const BYTES_PER_PIXEL: u64 = 2;

/// Batch request header as the target lays it out in its own memory:
/// batch index then batch size, both little-endian `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRequest {
    pub index: u16,
    pub size: u16,
}

impl BatchRequest {
    pub fn from_bytes(raw: [u8; 4]) -> Self {
        Self {
            index: u16::from_le_bytes([raw[0], raw[1]]),
            size: u16::from_le_bytes([raw[2], raw[3]]),
        }
    }

    /// Byte offset of this batch within the asset file.
    pub fn offset(&self) -> u64 {
        u64::from(self.index) * self.byte_len()
    }

    /// Byte length of this batch.
    pub fn byte_len(&self) -> u64 {
        u64::from(self.size) * BYTES_PER_PIXEL
    }
}

/// Service one pixel-delivery request: decode the 4-byte header at `addr`,
/// pull the matching byte range out of the asset file and write it back over
/// the header. The target reads its pixels out of the same buffer once it
/// resumes.
///
/// The asset is re-opened on every request; batches are never cached across
/// traps. A request that runs past the end of the asset fails with
/// [`AgentError::ShortRead`] and writes nothing back.
pub fn deliver_pixels<T: Target>(
    target: &mut T,
    addr: u32,
    asset: &Path,
) -> Result<(), AgentError<T::Error>> {
    let mut raw = [0u8; 4];
    target.read_memory(addr, &mut raw).map_err(AgentError::Memory)?;
    let request = BatchRequest::from_bytes(raw);

    let offset = request.offset();
    let wanted = request.byte_len() as usize;
    let mut batch = vec![0u8; wanted];

    let mut file = File::open(asset)?;
    file.seek(SeekFrom::Start(offset))?;
    if let Err(err) = file.read_exact(&mut batch) {
        return Err(if err.kind() == io::ErrorKind::UnexpectedEof {
            AgentError::ShortRead {
                offset,
                wanted,
                available: file.metadata()?.len(),
            }
        } else {
            err.into()
        });
    }

    log::debug!(
        "batch {} ({} pixels) served from offset {offset:#x}",
        request.index,
        request.size
    );
    target.write_memory(addr, &batch).map_err(AgentError::Memory)
}
