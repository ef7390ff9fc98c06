pub const BLOCK_SIZE: usize = 1024;

/// Identifies a formatted volume; the first 8 bytes of block 0.
pub const MAGIC: &[u8; 8] = b"BOBFS439";

pub const SUPERBLOCK_OFFSET: u64 = 0;
pub const DATA_BITMAP_OFFSET: u64 = BLOCK_SIZE as u64;
pub const INODE_BITMAP_OFFSET: u64 = 2 * BLOCK_SIZE as u64;
pub const INODE_TABLE_OFFSET: u64 = 3 * BLOCK_SIZE as u64;

pub const INODE_SIZE: usize = 16;

/// One bitmap block's worth of bits caps both inode and block counts.
pub const NUM_INODES: usize = BLOCK_SIZE * 8;
pub const NUM_BLOCKS: usize = BLOCK_SIZE * 8;

pub const INODE_TABLE_BLOCKS: usize = NUM_INODES * INODE_SIZE / BLOCK_SIZE;

/// First block index past the superblock, the two bitmaps, and the inode
/// table. Data-block allocation never returns an index below this.
pub const DATA_START_BLOCK: usize = 3 + INODE_TABLE_BLOCKS;

pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 4;

/// One direct block plus one level of indirection.
pub const MAX_FILE_SIZE: usize = BLOCK_SIZE + PTRS_PER_BLOCK * BLOCK_SIZE;
