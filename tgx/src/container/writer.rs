use super::header::{ENTRY_NAME_LENGTH, ENTRY_RECORD_SIZE, IDENTIFIER_LENGTH, TGX_MAGIC};

const HEADER_SIZE: usize = 16 + IDENTIFIER_LENGTH;

/// Serializes files into a TGX container: header, directory, then the file
/// data back to back in directory order.
///
/// Names and the identifier are truncated to their 256 byte fields.
pub fn write_container(version: u32, identifier: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let directory_offset = HEADER_SIZE;
    let data_offset = directory_offset + ENTRY_RECORD_SIZE * files.len();
    let data_len: usize = files.iter().map(|(_, data)| data.len()).sum();

    let mut out = Vec::with_capacity(data_offset + data_len);
    out.extend_from_slice(&TGX_MAGIC);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&(directory_offset as u32).to_le_bytes());
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    push_padded(&mut out, identifier, IDENTIFIER_LENGTH);

    let mut offset = data_offset;
    for (name, data) in files {
        push_padded(&mut out, name, ENTRY_NAME_LENGTH);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        offset += data.len();
    }

    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

fn push_padded(out: &mut Vec<u8>, text: &str, len: usize) {
    let bytes = &text.as_bytes()[..text.len().min(len)];
    out.extend_from_slice(bytes);
    out.resize(out.len() + len - bytes.len(), 0);
}
