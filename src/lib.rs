//! BobFS is a tiny inode-based block filesystem that sits on top of a raw
//! block device and provides files, directories, hard links, and recursive
//! unlink with reference counting. No journaling, no permissions, no
//! timestamps, no symlinks.
//!
//! Linear on-disk layout (1024-byte blocks, all integers little-endian):
//! - Superblock: 8-byte magic plus the root inode number
//! - Data bitmap (one block)
//! - Inode bitmap (one block)
//! - Inode table (16 bytes per inode)
//! - Data blocks
//!
//! Layers, bottom to top:
//! 1. Block device: byte-addressed storage primitive. | User implemented (hardware-specific)
//! 2. Bitmaps: inode-slot and data-block allocation.  | Fs implemented
//! 3. Node: one file or directory; byte I/O over direct + indirect blocks,
//!    directory records, link counts, recursive delete. | Fs implemented
//! 4. BobFs: superblock validation, mkfs/mount, root handle. | Fs implemented
//!
//! Every operation issues its device I/O directly and returns only after it
//! completes; nothing is cached and nothing is locked internally. Concurrent
//! use of one filesystem handle must be serialized externally.

mod bitmap;
mod block_dev;
mod config;
mod directory;
mod error;
mod fs;
mod node;
mod superblock;

pub use bitmap::Bitmap;
pub use block_dev::BlockDevice;
pub use config::*;
pub use directory::{DirEntry, DirSlot};
pub use error::FsError as Error;
pub use error::Result;
pub use fs::BobFs;
pub use node::{Node, NodeType};
