use log::debug;

use crate::bitmap::Bitmap;
use crate::config::*;
use crate::node::{Node, NodeType};
use crate::superblock;
use crate::{BlockDevice, Result};

/// The filesystem handle: owns the device for its lifetime, holds the two
/// bitmap views, and hands out inode handles. Operations are synchronous and
/// the handle is not internally locked; wrap it in a lock for concurrent use.
pub struct BobFs<D: BlockDevice> {
    pub(crate) device: D,
    pub(crate) data_bitmap: Bitmap,
    pub(crate) inode_bitmap: Bitmap,
    root_inumber: u32,
}

impl<D: BlockDevice> BobFs<D> {
    /// Mounts an already formatted volume. Fails with a magic mismatch if
    /// the device does not carry a recognized superblock.
    pub fn mount(device: D) -> Result<Self> {
        let root_inumber = superblock::read_superblock(&device)?;
        debug!("mounted volume, root inode {root_inumber}");
        Ok(BobFs {
            device,
            data_bitmap: Bitmap::new(DATA_BITMAP_OFFSET),
            inode_bitmap: Bitmap::new(INODE_BITMAP_OFFSET),
            root_inumber,
        })
    }

    /// Formats the device: writes the superblock with root inode 0, clears
    /// both bitmaps, reserves the layout prefix in the data bitmap, and
    /// initializes the root as an empty directory. Returns the mounted
    /// handle.
    pub fn mkfs(device: D) -> Result<Self> {
        superblock::write_superblock(&device, 0)?;
        device.write_at(DATA_BITMAP_OFFSET, &[0u8; BLOCK_SIZE])?;
        device.write_at(INODE_BITMAP_OFFSET, &[0u8; BLOCK_SIZE])?;

        let fs = BobFs {
            device,
            data_bitmap: Bitmap::new(DATA_BITMAP_OFFSET),
            inode_bitmap: Bitmap::new(INODE_BITMAP_OFFSET),
            root_inumber: 0,
        };
        // Superblock, bitmaps, and the inode table are never handed out as
        // data blocks.
        for block in 0..DATA_START_BLOCK as u32 {
            fs.data_bitmap.set_index(&fs.device, block, true)?;
        }
        fs.inode_bitmap.set_index(&fs.device, 0, true)?;
        fs.root().init(NodeType::Directory)?;
        debug!("formatted volume, {NUM_INODES} inode slots, data from block {DATA_START_BLOCK}");
        Ok(fs)
    }

    /// Handle to the root directory named by the superblock.
    pub fn root(&self) -> Node<'_, D> {
        self.node(self.root_inumber)
    }

    /// Handle to an arbitrary inode number. Handles carry no cached state,
    /// so two handles for the same number observe the same persisted bytes.
    pub fn node(&self, inumber: u32) -> Node<'_, D> {
        Node::new(self, inumber)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub(crate) fn device_u32(&self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.device.read_at(offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn set_device_u32(&self, offset: u64, value: u32) -> Result<()> {
        self.device.write_at(offset, &value.to_le_bytes())
    }
}
