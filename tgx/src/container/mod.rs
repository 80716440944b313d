pub mod header;
pub mod writer;

use ahash::AHashMap;

use crate::{
    binaries::{fixed_str, BinaryData},
    error::{TgxError, TgxResult},
};

pub use header::{TGXEntryRecord, TGXHeader, ENTRY_RECORD_SIZE, TGX_MAGIC};
pub use writer::write_container;

// TGX container layout:
//
// [0; 272)                                 TGXHeader
// [directory_offset; + 272 * entry_count)  TGXEntryRecord[entry_count]
// [entry.offset; entry.offset + length)    entry data, addressed from the file start

/// A named sub-file inside a container. The data borrows from the container bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    pub name: &'a str,
    pub byte_offset: u32,
    pub kind: u32,
    pub byte_length: u32,
    data: &'a [u8],
}

impl<'a> Entry<'a> {
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// Parsed directory of a TGX container.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    pub magic: [u8; 4],
    pub version: u32,
    pub directory_offset: u32,
    pub identifier: &'a str,
    entries: Vec<Entry<'a>>,
    by_name: AHashMap<&'a str, usize>,
}

impl<'a> Container<'a> {
    /// Parses the header and the whole directory. Either every entry is valid
    /// or the call fails, there are no partial directories.
    pub fn parse(bytes: &'a [u8]) -> TgxResult<Self> {
        let header = TGXHeader::view(bytes, 0).ok_or_else(|| {
            TgxError::MalformedContainer(format!(
                "{} bytes is too short for the container header",
                bytes.len()
            ))
        })?;

        if header.magic != TGX_MAGIC {
            return Err(TgxError::MalformedContainer(format!(
                "bad magic {:?}",
                header.magic
            )));
        }

        let identifier = header.identifier().ok_or_else(|| {
            TgxError::MalformedContainer("container identifier is not utf-8".to_owned())
        })?;

        let directory_offset = header.directory_offset();
        let entry_count = header.entry_count() as usize;

        let records = TGXEntryRecord::view_array(bytes, directory_offset as usize, entry_count)
            .ok_or_else(|| {
                TgxError::MalformedContainer(format!(
                    "directory of {entry_count} entries at {directory_offset} overruns {} bytes",
                    bytes.len()
                ))
            })?;

        let mut entries = Vec::with_capacity(entry_count);
        let mut by_name = AHashMap::with_capacity(entry_count);

        for (i, record) in records.iter().enumerate() {
            let entry = Self::read_entry(bytes, record, i)?;

            if by_name.insert(entry.name, i).is_some() {
                return Err(TgxError::MalformedContainer(format!(
                    "duplicate entry name {:?}",
                    entry.name
                )));
            }
            entries.push(entry);
        }

        log::debug!(
            "TGX container {identifier:?} v{}: {} entries",
            header.version(),
            entries.len()
        );

        Ok(Self {
            magic: header.magic,
            version: header.version(),
            directory_offset,
            identifier,
            entries,
            by_name,
        })
    }

    fn read_entry(bytes: &'a [u8], record: &'a TGXEntryRecord, i: usize) -> TgxResult<Entry<'a>> {
        let name = fixed_str(&record.name).ok_or_else(|| {
            TgxError::MalformedContainer(format!("entry {i} name is not utf-8"))
        })?;

        let start = record.offset() as usize;
        let data = start
            .checked_add(record.length() as usize)
            .and_then(|end| bytes.get(start..end))
            .ok_or_else(|| {
                TgxError::MalformedContainer(format!(
                    "entry {name:?} range {start}+{} overruns {} bytes",
                    record.length(),
                    bytes.len()
                ))
            })?;

        Ok(Entry {
            name,
            byte_offset: record.offset(),
            kind: record.kind(),
            byte_length: record.length(),
            data,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries in directory order.
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&Entry<'a>> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn file(&self, name: &str) -> Option<&'a [u8]> {
        self.entry(name).map(Entry::data)
    }

    /// Like [`Container::file`], for sub-files the caller cannot do without.
    pub fn require(&self, name: &str) -> TgxResult<&'a [u8]> {
        self.file(name)
            .ok_or_else(|| TgxError::MissingFile(name.to_owned()))
    }
}
