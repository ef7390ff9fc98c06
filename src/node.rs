//! The inode engine: byte-addressed reads and writes over block-addressed
//! storage, lazy direct/indirect allocation, and link-count-driven
//! reclamation.
//!
//! A [`Node`] is a lightweight view keyed by inode number. It caches nothing:
//! every metadata access goes to the 16-byte on-disk record, so two handles
//! for the same inode number always observe the same persisted bytes.

use log::debug;

use crate::bitmap;
use crate::config::*;
use crate::error::FsError;
use crate::fs::BobFs;
use crate::{BlockDevice, Result};

/// On-disk inode record layout, 16 bytes per inode:
/// type u16 | links u16 | size u32 | direct u32 | indirect u32.
const TYPE_OFFSET: u64 = 0;
const LINKS_OFFSET: u64 = 2;
const SIZE_OFFSET: u64 = 4;
const DIRECT_OFFSET: u64 = 8;
const INDIRECT_OFFSET: u64 = 12;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Directory = 1,
    File = 2,
}

pub struct Node<'fs, D: BlockDevice> {
    pub(crate) fs: &'fs BobFs<D>,
    pub(crate) inumber: u32,
    base: u64,
}

impl<'fs, D: BlockDevice> Node<'fs, D> {
    pub(crate) fn new(fs: &'fs BobFs<D>, inumber: u32) -> Self {
        Node {
            fs,
            inumber,
            base: INODE_TABLE_OFFSET + inumber as u64 * INODE_SIZE as u64,
        }
    }

    pub fn inumber(&self) -> u32 {
        self.inumber
    }

    pub fn node_type(&self) -> Result<NodeType> {
        match self.field_u16(TYPE_OFFSET)? {
            1 => Ok(NodeType::Directory),
            2 => Ok(NodeType::File),
            other => Err(FsError::UnknownNodeType(other)),
        }
    }

    pub fn is_directory(&self) -> Result<bool> {
        Ok(self.node_type()? == NodeType::Directory)
    }

    pub fn is_file(&self) -> Result<bool> {
        Ok(self.node_type()? == NodeType::File)
    }

    pub fn links(&self) -> Result<u16> {
        self.field_u16(LINKS_OFFSET)
    }

    /// Logical byte length of the content.
    pub fn size(&self) -> Result<u32> {
        self.field_u32(SIZE_OFFSET)
    }

    fn direct(&self) -> Result<u32> {
        self.field_u32(DIRECT_OFFSET)
    }

    fn indirect(&self) -> Result<u32> {
        self.field_u32(INDIRECT_OFFSET)
    }

    pub(crate) fn set_links(&self, links: u16) -> Result<()> {
        self.set_field_u16(LINKS_OFFSET, links)
    }

    fn set_size(&self, size: u32) -> Result<()> {
        self.set_field_u32(SIZE_OFFSET, size)
    }

    fn set_direct(&self, block: u32) -> Result<()> {
        self.set_field_u32(DIRECT_OFFSET, block)
    }

    fn set_indirect(&self, block: u32) -> Result<()> {
        self.set_field_u32(INDIRECT_OFFSET, block)
    }

    /// Initializes a freshly allocated inode: the given type, one link, and
    /// no content or blocks.
    pub(crate) fn init(&self, node_type: NodeType) -> Result<()> {
        self.set_field_u16(TYPE_OFFSET, node_type as u16)?;
        self.set_links(1)?;
        self.set_size(0)?;
        self.set_direct(0)?;
        self.set_indirect(0)
    }

    /// Writes at most up to the end of the block containing `offset`; the
    /// count is clamped to the room left before the block boundary. Callers
    /// needing more call [`Node::write_all`]. Data blocks, and the indirect
    /// pointer block once `offset` crosses the first block, are allocated
    /// lazily and zero-filled. Afterwards `size` is raised to cover the last
    /// byte written. Returns the number of bytes written.
    pub fn write(&self, offset: u32, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if offset as usize >= MAX_FILE_SIZE {
            return Err(FsError::FileTooLarge);
        }
        let room = BLOCK_SIZE - offset as usize % BLOCK_SIZE;
        let n = buf.len().min(room);

        let block = if (offset as usize) < BLOCK_SIZE {
            let mut direct = self.direct()?;
            if direct == 0 {
                direct = self.alloc_zeroed_block()?;
                self.set_direct(direct)?;
            }
            direct
        } else {
            let mut indirect = self.indirect()?;
            if indirect == 0 {
                indirect = self.alloc_zeroed_block()?;
                self.set_indirect(indirect)?;
            }
            let slot = offset / BLOCK_SIZE as u32 - 1;
            let slot_offset = indirect as u64 * BLOCK_SIZE as u64 + slot as u64 * 4;
            let mut data = self.fs.device_u32(slot_offset)?;
            if data == 0 {
                data = self.alloc_zeroed_block()?;
                self.fs.set_device_u32(slot_offset, data)?;
            }
            data
        };

        let dest = block as u64 * BLOCK_SIZE as u64 + (offset as usize % BLOCK_SIZE) as u64;
        self.fs.device.write_at(dest, &buf[..n])?;

        let size = self.size()?;
        if offset + n as u32 > size {
            self.set_size(offset + n as u32)?;
        }
        Ok(n)
    }

    /// Loops [`Node::write`] until all of `buf` is on the device.
    pub fn write_all(&self, offset: u32, buf: &[u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.write(offset + total as u32, &buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    /// Reads at most up to the end of the block containing `offset`, with the
    /// same clamping as [`Node::write`]. A range whose direct block, indirect
    /// slot, or data block was never allocated reads as zeros. The inode's
    /// `size` is not consulted; see [`Node::read_all`] for the bounded read.
    pub fn read(&self, offset: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if offset as usize >= MAX_FILE_SIZE {
            return Err(FsError::FileTooLarge);
        }
        let room = BLOCK_SIZE - offset as usize % BLOCK_SIZE;
        let n = buf.len().min(room);

        let block = if (offset as usize) < BLOCK_SIZE {
            self.direct()?
        } else {
            let indirect = self.indirect()?;
            if indirect == 0 {
                0
            } else {
                let slot = offset / BLOCK_SIZE as u32 - 1;
                self.fs
                    .device_u32(indirect as u64 * BLOCK_SIZE as u64 + slot as u64 * 4)?
            }
        };

        if block == 0 {
            buf[..n].fill(0);
        } else {
            let src = block as u64 * BLOCK_SIZE as u64 + (offset as usize % BLOCK_SIZE) as u64;
            self.fs.device.read_at(src, &mut buf[..n])?;
        }
        Ok(n)
    }

    /// Loops [`Node::read`], clamping the count so the read never extends
    /// past the inode's recorded size. Fails if `offset` is at or past the
    /// end. Returns the number of bytes read.
    pub fn read_all(&self, offset: u32, buf: &mut [u8]) -> Result<usize> {
        let size = self.size()?;
        if offset >= size {
            return Err(FsError::OutOfBounds);
        }
        let n = buf.len().min((size - offset) as usize);
        let mut total = 0;
        while total < n {
            let cnt = self.read(offset + total as u32, &mut buf[total..n])?;
            if cnt == 0 {
                break;
            }
            total += cnt;
        }
        Ok(total)
    }

    /// Reads a little-endian u32 out of this inode's byte stream.
    pub(crate) fn stream_u32(&self, offset: u32) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_all(offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Decrements the link count; on the last link, destroys the inode. A
    /// dying directory is emptied depth-first: every child record is
    /// processed recursively before this inode's own bit and blocks are
    /// released. Returns the number of inodes destroyed, nested ones
    /// included.
    pub(crate) fn fix_inode(&self) -> Result<u32> {
        let links = self.links()?;
        if links > 1 {
            self.set_links(links - 1)?;
            return Ok(0);
        }

        let size = self.size()?;
        let mut count = 1;
        if self.node_type()? == NodeType::Directory {
            let mut offset = 0;
            while offset < size {
                let child = self.stream_u32(offset)?;
                let name_len = self.stream_u32(offset + 4)?;
                offset += 8 + name_len;
                count += self.fs.node(child).fix_inode()?;
            }
        }
        self.fs
            .inode_bitmap
            .set_index(&self.fs.device, self.inumber, false)?;
        if size > 0 {
            self.release_blocks()?;
        }
        debug!("reclaimed inode {}", self.inumber);
        Ok(count)
    }

    /// Finds a free data block, zero-fills it, and marks it allocated.
    fn alloc_zeroed_block(&self) -> Result<u32> {
        let block = bitmap::find_free_data_block(&self.fs.device)?;
        self.fs
            .device
            .write_at(block as u64 * BLOCK_SIZE as u64, &[0u8; BLOCK_SIZE])?;
        self.fs.data_bitmap.set_index(&self.fs.device, block, true)?;
        Ok(block)
    }

    /// Releases every data block this inode owns, the indirect pointer block
    /// included. Only called while the inode is being destroyed.
    fn release_blocks(&self) -> Result<()> {
        let device = &self.fs.device;
        let direct = self.direct()?;
        if direct != 0 {
            self.fs.data_bitmap.set_index(device, direct, false)?;
        }
        let indirect = self.indirect()?;
        if indirect != 0 {
            let mut buf = [0u8; BLOCK_SIZE];
            device.read_at(indirect as u64 * BLOCK_SIZE as u64, &mut buf)?;
            for slot in buf.chunks_exact(4) {
                let ptr = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]);
                if ptr != 0 {
                    self.fs.data_bitmap.set_index(device, ptr, false)?;
                }
            }
            self.fs.data_bitmap.set_index(device, indirect, false)?;
        }
        Ok(())
    }

    /// Releases the data block backing logical block `logical` and zeroes its
    /// pointer, so a later write re-allocates lazily. Logical block 0 is the
    /// direct block; block `k >= 1` lives in indirect slot `k - 1`. The
    /// indirect pointer block itself stays allocated until the inode dies.
    pub(crate) fn release_tail_block(&self, logical: u32) -> Result<()> {
        let device = &self.fs.device;
        if logical == 0 {
            let direct = self.direct()?;
            if direct != 0 {
                self.fs.data_bitmap.set_index(device, direct, false)?;
                self.set_direct(0)?;
            }
        } else {
            let indirect = self.indirect()?;
            if indirect == 0 {
                return Ok(());
            }
            let slot_offset = indirect as u64 * BLOCK_SIZE as u64 + (logical as u64 - 1) * 4;
            let ptr = self.fs.device_u32(slot_offset)?;
            if ptr != 0 {
                self.fs.data_bitmap.set_index(device, ptr, false)?;
                self.fs.set_device_u32(slot_offset, 0)?;
            }
        }
        Ok(())
    }

    /// Shrinks the recorded size. Any logical block now entirely past the
    /// new size is released first.
    pub(crate) fn shrink(&self, new_size: u32) -> Result<()> {
        let size = self.size()?;
        let old_blocks = size.div_ceil(BLOCK_SIZE as u32);
        let first_dead = new_size.div_ceil(BLOCK_SIZE as u32);
        for logical in first_dead..old_blocks {
            self.release_tail_block(logical)?;
        }
        self.set_size(new_size)
    }

    fn field_u16(&self, offset: u64) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fs.device.read_at(self.base + offset, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn field_u32(&self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fs.device.read_at(self.base + offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn set_field_u16(&self, offset: u64, value: u16) -> Result<()> {
        self.fs.device.write_at(self.base + offset, &value.to_le_bytes())
    }

    fn set_field_u32(&self, offset: u64, value: u32) -> Result<()> {
        self.fs.device.write_at(self.base + offset, &value.to_le_bytes())
    }
}
