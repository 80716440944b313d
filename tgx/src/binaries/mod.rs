use std::mem;

/// Fixed-size on-disk record that can be viewed in place inside a byte buffer.
///
/// Records are `#[repr(C, packed)]` (alignment 1), so a view never copies and
/// never fails on alignment, only on length. Multi-byte fields are stored
/// little-endian and must go through `from_le` when read.
pub trait BinaryData: bytemuck::Pod {
    fn view(bytes: &[u8], offset: usize) -> Option<&Self> {
        let end = offset.checked_add(mem::size_of::<Self>())?;
        bytemuck::try_from_bytes(bytes.get(offset..end)?).ok()
    }

    fn view_array(bytes: &[u8], offset: usize, count: usize) -> Option<&[Self]> {
        let len = count.checked_mul(mem::size_of::<Self>())?;
        let end = offset.checked_add(len)?;
        bytemuck::try_cast_slice(bytes.get(offset..end)?).ok()
    }
}

impl<T: bytemuck::Pod> BinaryData for T {}

/// Reads a NUL padded fixed-length string field, dropping the trailing padding.
pub fn fixed_str(field: &[u8]) -> Option<&str> {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    std::str::from_utf8(&field[..end]).ok()
}

/// Little-endian `u16` values packed back to back. A trailing odd byte is ignored.
pub fn le_u16s(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
}

#[cfg(test)]
mod binaries_tests {
    use super::*;

    #[repr(C, packed)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Pair {
        a: u16,
        b: u32,
    }

    #[test]
    fn view_reads_unaligned_records() {
        let bytes = [0xFF, 1, 0, 2, 0, 0, 0];
        let pair = Pair::view(&bytes, 1).unwrap();
        let (a, b) = (pair.a, pair.b);
        assert_eq!(u16::from_le(a), 1);
        assert_eq!(u32::from_le(b), 2);
        assert!(Pair::view(&bytes, 2).is_none());
    }

    #[test]
    fn view_array_checks_length() {
        let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let records = <[u8; 4]>::view_array(&bytes, 0, 2).unwrap();
        assert_eq!(records, &[[1, 2, 3, 4], [5, 6, 7, 8]]);
        assert!(<[u8; 4]>::view_array(&bytes, 4, 2).is_none());
        assert!(<[u8; 4]>::view_array(&bytes, usize::MAX, 2).is_none());
    }

    #[test]
    fn fixed_str_trims_padding() {
        assert_eq!(fixed_str(b"render_metadata.js\0\0\0"), Some("render_metadata.js"));
        assert_eq!(fixed_str(b"\0\0\0\0"), Some(""));
        assert_eq!(fixed_str(&[0xC3, 0x28, 0]), None);
    }

    #[test]
    fn le_u16s_pairs_bytes() {
        let values: Vec<u16> = le_u16s(&[1, 0, 0xFF, 0xFF, 7]).collect();
        assert_eq!(values, vec![1, 0xFFFF]);
    }
}
