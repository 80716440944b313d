use num_derive::FromPrimitive;

use crate::{
    binaries::le_u16s,
    error::{TgxError, TgxResult},
};

/// Strip restart marker.
pub const STRIP_RESTART: u16 = 0xFFFF;

const EVEN_WINDING: [usize; 3] = [0, 1, 2];
const ODD_WINDING: [usize; 3] = [1, 0, 2];

#[derive(Copy, Clone, FromPrimitive, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    TriangleList = 3,
    TriangleStrip = 5,
}

/// Slice of the index buffer owned by one stage part, in indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub start: usize,
    pub count: usize,
}

/// Flat triangle list, three indices per face.
pub type TriangleList = Box<[u16]>;

/// Reads `byte_size / value_byte_size` little-endian `u16` values.
///
/// Index buffers are always read as `u16`, whatever their declared value size.
pub fn read_indices(bytes: &[u8], byte_size: usize, value_byte_size: usize) -> TgxResult<Box<[u16]>> {
    let count = byte_size.checked_div(value_byte_size).ok_or_else(|| {
        TgxError::InvalidLayout("index buffer has a zero value size".to_owned())
    })?;

    let indices: Box<[u16]> = le_u16s(bytes).take(count).collect();
    if indices.len() < count {
        log::warn!(
            "Index buffer holds {} values, metadata declares {count}",
            indices.len()
        );
    }
    Ok(indices)
}

/// Builds the triangle list of one part.
///
/// Strips alternate winding per face and restart on [`STRIP_RESTART`],
/// which also resets the alternation. Any index at or past `vertex_count`
/// fails the whole part.
pub fn build_triangles(
    indices: &[u16],
    part: PartRange,
    primitive: PrimitiveType,
    vertex_count: usize,
) -> TgxResult<TriangleList> {
    let (step, faces) = match primitive {
        PrimitiveType::TriangleList => (3, part.count),
        PrimitiveType::TriangleStrip => (1, part.count.saturating_sub(2)),
    };

    let mut triangles = Vec::with_capacity(faces / step * 3);
    let mut parity = 0usize;

    for i in (0..faces).step_by(step) {
        let position = part.start + i;
        let face: &[u16; 3] = indices
            .get(position..position + 3)
            .and_then(|f| f.try_into().ok())
            .ok_or(TgxError::IndexBufferOverrun {
                position,
                len: indices.len(),
            })?;

        if face.contains(&STRIP_RESTART) {
            parity = 0;
            continue;
        }

        let winding = if primitive == PrimitiveType::TriangleList || parity % 2 == 0 {
            EVEN_WINDING
        } else {
            ODD_WINDING
        };

        for corner in winding {
            let index = face[corner];
            if index as usize >= vertex_count {
                return Err(TgxError::IndexOutOfRange {
                    index,
                    position: position + corner,
                    vertex_count,
                });
            }
            triangles.push(index);
        }
        parity += 1;
    }

    Ok(triangles.into_boxed_slice())
}
