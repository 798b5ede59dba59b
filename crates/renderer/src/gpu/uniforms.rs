use tracing::warn;

use crate::frame::UniformWrite;
use crate::program::UniformBlock;

/// CPU copy of one uniform block.
///
/// Writes land here by location and the whole block is flushed to the GPU
/// buffer when dirty.
#[derive(Debug)]
pub(crate) struct UniformStaging {
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformStaging {
    pub fn for_block(block: &UniformBlock) -> Self {
        let members_end = block
            .members()
            .map(|(_, member)| member.location.offset() + member.size)
            .max()
            .unwrap_or(0);
        // std140 blocks are bound in 16-byte multiples.
        let size = (block.size.max(members_end) as usize)
            .max(16)
            .next_multiple_of(16);
        Self {
            bytes: vec![0; size],
            dirty: true,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn apply(&mut self, write: &UniformWrite) {
        let start = write.location.offset() as usize;
        let data = write.value.as_bytes();
        let Some(slot) = self.bytes.get_mut(start..start + data.len()) else {
            warn!(
                offset = start,
                len = data.len(),
                block = self.bytes.len(),
                "uniform write outside of block; ignoring"
            );
            return;
        };
        if slot != data {
            slot.copy_from_slice(data);
            self.dirty = true;
        }
    }

    /// Returns the block contents if anything changed since the last flush.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.bytes)
        } else {
            None
        }
    }
}
