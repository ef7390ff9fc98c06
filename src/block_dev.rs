use crate::error::FsError;

pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads exactly `buf.len()` bytes starting at the flat byte `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), FsError>;

    /// Writes exactly `buf.len()` bytes starting at the flat byte `offset`.
    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), FsError>;

    /// Flushes any buffered writes to the underlying medium.
    fn flush(&self) -> Result<(), FsError> {
        Ok(())
    }

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        crate::config::BLOCK_SIZE
    }
}
