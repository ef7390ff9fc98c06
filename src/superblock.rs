use crate::config::*;
use crate::error::FsError;
use crate::{BlockDevice, Result};

/// Reads the 12-byte superblock region and returns the stored root inode
/// number. Fails if the magic does not match.
pub(crate) fn read_superblock(device: &impl BlockDevice) -> Result<u32> {
    let mut buf = [0u8; 12];
    device.read_at(SUPERBLOCK_OFFSET, &mut buf)?;
    if &buf[..8] != MAGIC {
        return Err(FsError::BadMagic);
    }
    Ok(u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]))
}

/// Zero-fills block 0, then writes the magic and the root inode number.
pub(crate) fn write_superblock(device: &impl BlockDevice, root_inumber: u32) -> Result<()> {
    device.write_at(SUPERBLOCK_OFFSET, &[0u8; BLOCK_SIZE])?;
    device.write_at(SUPERBLOCK_OFFSET, MAGIC)?;
    device.write_at(SUPERBLOCK_OFFSET + 8, &root_inumber.to_le_bytes())?;
    device.flush()
}
