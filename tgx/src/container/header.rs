use std::{fmt, mem};

use crate::binaries::fixed_str;

pub const TGX_MAGIC: [u8; 4] = *b"TGXM";
pub const IDENTIFIER_LENGTH: usize = 256;
pub const ENTRY_NAME_LENGTH: usize = 256;

// struct tgxFormat {
//     char magic[4];              // "TGXM"
//     uint version;
//     uint directory_offset;      // first byte of entries[entry_count]
//     uint entry_count;
//     char identifier[256];       // XXXXXXXXXX-X, NUL padded
// }
#[repr(C, packed)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TGXHeader {
    pub magic: [u8; 4],
    version: u32,
    directory_offset: u32,
    entry_count: u32,
    pub identifier: [u8; IDENTIFIER_LENGTH],
}

const _: () = assert!(mem::size_of::<TGXHeader>() == 16 + IDENTIFIER_LENGTH);

impl TGXHeader {
    pub fn version(&self) -> u32 {
        u32::from_le(self.version)
    }

    pub fn directory_offset(&self) -> u32 {
        u32::from_le(self.directory_offset)
    }

    pub fn entry_count(&self) -> u32 {
        u32::from_le(self.entry_count)
    }

    pub fn identifier(&self) -> Option<&str> {
        fixed_str(&self.identifier)
    }
}

impl fmt::Debug for TGXHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TGXHeader")
            .field("magic", &self.magic)
            .field("version", &self.version())
            .field("directory_offset", &self.directory_offset())
            .field("entry_count", &self.entry_count())
            .field("identifier", &self.identifier())
            .finish()
    }
}

// One directory record, 256 + 4 + 4 + 4 + 4 = 272 bytes.
// The trailing word does not carry data, it keeps the record length even.
#[repr(C, packed)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TGXEntryRecord {
    pub name: [u8; ENTRY_NAME_LENGTH],
    offset: u32,
    kind: u32,
    length: u32,
    _padding: u32,
}

pub const ENTRY_RECORD_SIZE: usize = mem::size_of::<TGXEntryRecord>();

const _: () = assert!(ENTRY_RECORD_SIZE == 272);

impl TGXEntryRecord {
    /// Offset of the entry data from the start of the container.
    pub fn offset(&self) -> u32 {
        u32::from_le(self.offset)
    }

    /// Always 0 in known containers.
    pub fn kind(&self) -> u32 {
        u32::from_le(self.kind)
    }

    pub fn length(&self) -> u32 {
        u32::from_le(self.length)
    }

    pub fn name(&self) -> Option<&str> {
        fixed_str(&self.name)
    }
}

impl fmt::Debug for TGXEntryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TGXEntryRecord")
            .field("name", &self.name())
            .field("offset", &self.offset())
            .field("kind", &self.kind())
            .field("length", &self.length())
            .finish()
    }
}
