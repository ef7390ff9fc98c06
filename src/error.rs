use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("device i/o failed")]
    Io,
    #[error("access outside the device or file bounds")]
    OutOfBounds,
    #[error("superblock magic does not match")]
    BadMagic,
    #[error("no free inodes left")]
    NoFreeInodes,
    #[error("no free data blocks left")]
    NoFreeDataBlocks,
    #[error("operation requires a directory inode")]
    NotDirectory,
    #[error("offset exceeds the maximum file size")]
    FileTooLarge,
    #[error("unknown inode type {0}")]
    UnknownNodeType(u16),
}

pub type Result<T> = core::result::Result<T, FsError>;
