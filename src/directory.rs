//! Directory-record encoding over an inode's byte stream.
//!
//! Records sit back-to-back with no padding or tombstones:
//! `[inumber u32][name_len u32][name bytes]`. Removal physically shifts the
//! trailing bytes left and shrinks the directory. Ordering is insertion
//! order. The storage layer does not enforce name uniqueness; callers are
//! expected to look a name up before inserting it.

use log::debug;

use crate::bitmap;
use crate::error::FsError;
use crate::node::{Node, NodeType};
use crate::{BlockDevice, Result};

/// Where a matched record sits in a directory's byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirSlot {
    pub inumber: u32,
    pub entry_offset: u32,
    pub name_len: u32,
}

/// One decoded directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inumber: u32,
    pub name: Vec<u8>,
}

impl<'fs, D: BlockDevice> Node<'fs, D> {
    /// Linear scan of the record stream for `name`, byte for byte. The first
    /// match wins.
    pub fn search(&self, name: &[u8]) -> Result<Option<DirSlot>> {
        if !self.is_directory()? {
            return Err(FsError::NotDirectory);
        }
        let size = self.size()?;
        let mut offset = 0;
        while offset < size {
            let entry_offset = offset;
            let inumber = self.stream_u32(offset)?;
            let name_len = self.stream_u32(offset + 4)?;
            offset += 8;
            let mut entry_name = vec![0u8; name_len as usize];
            if name_len > 0 {
                self.read_all(offset, &mut entry_name)?;
            }
            offset += name_len;
            if entry_name == name {
                return Ok(Some(DirSlot {
                    inumber,
                    entry_offset,
                    name_len,
                }));
            }
        }
        Ok(None)
    }

    /// Looks `name` up and returns a handle to the child inode.
    pub fn find_node(&self, name: &[u8]) -> Result<Option<Node<'fs, D>>> {
        Ok(self.search(name)?.map(|slot| self.fs.node(slot.inumber)))
    }

    /// Appends one record at the current end of the byte stream.
    fn add_entry(&self, name: &[u8], inumber: u32) -> Result<()> {
        let size = self.size()?;
        self.write_all(size, &inumber.to_le_bytes())?;
        self.write_all(size + 4, &(name.len() as u32).to_le_bytes())?;
        self.write_all(size + 8, name)?;
        Ok(())
    }

    fn new_node(&self, name: &[u8], node_type: NodeType) -> Result<Node<'fs, D>> {
        if !self.is_directory()? {
            return Err(FsError::NotDirectory);
        }
        let inumber = bitmap::find_free_inode(&self.fs.device)?;
        self.fs.inode_bitmap.set_index(&self.fs.device, inumber, true)?;
        self.add_entry(name, inumber)?;
        let node = self.fs.node(inumber);
        node.init(node_type)?;
        Ok(node)
    }

    /// Creates an empty file under this directory.
    pub fn new_file(&self, name: &[u8]) -> Result<Node<'fs, D>> {
        self.new_node(name, NodeType::File)
    }

    /// Creates an empty directory under this directory.
    pub fn new_directory(&self, name: &[u8]) -> Result<Node<'fs, D>> {
        self.new_node(name, NodeType::Directory)
    }

    /// Hard link: appends an entry for an already existing inode under
    /// `name` and increments its link count. No inode is allocated.
    pub fn link_node(&self, name: &[u8], node: &Node<'fs, D>) -> Result<()> {
        if !self.is_directory()? {
            return Err(FsError::NotDirectory);
        }
        self.add_entry(name, node.inumber())?;
        node.set_links(node.links()? + 1)
    }

    /// Compacts the record out of the byte stream: everything after it moves
    /// down, then the directory shrinks, releasing any data block that fell
    /// entirely past the new size.
    fn remove_entry(&self, slot: &DirSlot) -> Result<()> {
        let size = self.size()?;
        let record_len = 8 + slot.name_len;
        let tail_len = (size - slot.entry_offset - record_len) as usize;
        if tail_len > 0 {
            let mut tail = vec![0u8; tail_len];
            self.read_all(slot.entry_offset + record_len, &mut tail)?;
            self.write_all(slot.entry_offset, &tail)?;
        }
        self.shrink(size - record_len)
    }

    /// Removes `name` from this directory and garbage-collects the inode it
    /// referenced. A missing name is a no-op. Returns the number of inodes
    /// actually destroyed, which is zero when other hard links keep the
    /// target alive.
    pub fn unlink(&self, name: &[u8]) -> Result<u32> {
        if !self.is_directory()? {
            return Err(FsError::NotDirectory);
        }
        let Some(slot) = self.search(name)? else {
            return Ok(0);
        };
        self.remove_entry(&slot)?;
        let count = self.fs.node(slot.inumber).fix_inode()?;
        debug!(
            "unlink {}: {count} inode(s) destroyed",
            String::from_utf8_lossy(name)
        );
        Ok(count)
    }

    /// Decodes every record in insertion order.
    pub fn read_dir(&self) -> Result<Vec<DirEntry>> {
        if !self.is_directory()? {
            return Err(FsError::NotDirectory);
        }
        let size = self.size()?;
        let mut entries = Vec::new();
        let mut offset = 0;
        while offset < size {
            let inumber = self.stream_u32(offset)?;
            let name_len = self.stream_u32(offset + 4)?;
            offset += 8;
            let mut name = vec![0u8; name_len as usize];
            if name_len > 0 {
                self.read_all(offset, &mut name)?;
            }
            offset += name_len;
            entries.push(DirEntry { inumber, name });
        }
        Ok(entries)
    }
}
