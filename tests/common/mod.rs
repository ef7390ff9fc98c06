use std::sync::{Arc, Mutex};

use bobfs::{BLOCK_SIZE, BlockDevice, Error};

/// Byte-addressed in-memory device. Clones share the same storage, so a
/// volume can be formatted through one handle and remounted through another.
#[derive(Clone)]
pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_blocks: usize,
}

impl RamDisk {
    /// Creates a new RamDisk with the specified number of blocks.
    /// Each block is BLOCK_SIZE bytes.
    pub fn new(num_blocks: usize) -> Self {
        RamDisk {
            inner: Arc::new(Mutex::new(vec![0u8; num_blocks * BLOCK_SIZE])),
            num_blocks,
        }
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), Error> {
        let start = offset as usize;
        let data = self.inner.lock().unwrap();
        if start + buf.len() > data.len() {
            return Err(Error::OutOfBounds);
        }
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), Error> {
        let start = offset as usize;
        let mut data = self.inner.lock().unwrap();
        if start + buf.len() > data.len() {
            return Err(Error::OutOfBounds);
        }
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
