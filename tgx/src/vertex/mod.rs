pub mod bitfield;

use flagset::{flags, FlagSet};
use glam::{Vec2, Vec3, Vec4};

use crate::{
    config::Game,
    error::{TgxError, TgxResult},
    layout::{Layout, ScalarType, Semantic, VertexElement},
};

pub use bitfield::{BoneBinding, NormalW};

flags! {
    /// Channels written from vertex data rather than left at zero.
    pub enum VertexFlag: u8 {
        BlendIndices = 0b001,
        BlendWeight = 0b010,
        Texcoord2 = 0b100,
    }
}

/// Mesh level transforms applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTransform {
    pub position_scale: Vec3,
    pub position_offset: Vec3,
    pub texcoord_scale: Vec2,
    pub texcoord_offset: Vec2,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            position_scale: Vec3::ONE,
            position_offset: Vec3::ZERO,
            texcoord_scale: Vec2::ONE,
            texcoord_offset: Vec2::ZERO,
        }
    }
}

/// One vertex buffer sub-file and the layout of its strides.
#[derive(Debug, Clone, Copy)]
pub struct VertexStream<'a> {
    pub layout: &'a Layout,
    pub bytes: &'a [u8],
}

impl<'a> VertexStream<'a> {
    fn read(&self, stream: usize, vertex: usize, element: &VertexElement) -> TgxResult<[f64; 4]> {
        let len = element.byte_size();
        let offset = vertex * self.layout.stride + element.byte_offset as usize;
        let corrupt = || TgxError::CorruptVertexStream {
            stream,
            offset,
            len,
            available: self.bytes.len(),
        };

        let bytes = self.bytes.get(offset..offset + len).ok_or_else(corrupt)?;
        let size = element.scalar_type.byte_size();

        let mut raw = [0.0; 4];
        for (value, scalar) in raw.iter_mut().zip(bytes.chunks_exact(size)) {
            *value = element.scalar_type.read(scalar).ok_or_else(corrupt)?;
        }
        Ok(raw)
    }
}

/// Inclusive range of uv-scale stride indices seen in normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvScaleRange {
    pub min: u16,
    pub max: u16,
}

impl UvScaleRange {
    fn include(range: &mut Option<Self>, index: u16) {
        *range = Some(match *range {
            Some(r) => Self {
                min: r.min.min(index),
                max: r.max.max(index),
            },
            None => Self {
                min: index,
                max: index,
            },
        });
    }
}

/// Per-vertex output channels, one entry per vertex in each.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedVertexBuffers {
    pub vertex_count: usize,
    pub position: Box<[Vec3]>,
    /// Raw 4th position component, a [`BoneBinding`].
    pub position_w: Box<[f32]>,
    pub normal: Box<[Vec3]>,
    pub dye_slot: Box<[u8]>,
    pub tangent: Box<[Vec4]>,
    pub texcoord0: Box<[Vec2]>,
    pub texcoord2: Box<[Vec2]>,
    pub color: Box<[Vec4]>,
    pub blend_indices: Box<[Vec4]>,
    pub blend_weight: Box<[Vec4]>,
    /// Low 8 bits of the stride index. The full value only shows in `uv_scale_range`.
    pub uv_scale_stride_index: Box<[u8]>,
    pub flags: Box<[FlagSet<VertexFlag>]>,
    pub uv_scale_range: Option<UvScaleRange>,
}

impl DecodedVertexBuffers {
    pub fn zeroed(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            position: bytemuck::zeroed_slice_box(vertex_count),
            position_w: bytemuck::zeroed_slice_box(vertex_count),
            normal: bytemuck::zeroed_slice_box(vertex_count),
            dye_slot: bytemuck::zeroed_slice_box(vertex_count),
            tangent: bytemuck::zeroed_slice_box(vertex_count),
            texcoord0: bytemuck::zeroed_slice_box(vertex_count),
            texcoord2: bytemuck::zeroed_slice_box(vertex_count),
            color: bytemuck::zeroed_slice_box(vertex_count),
            blend_indices: bytemuck::zeroed_slice_box(vertex_count),
            blend_weight: bytemuck::zeroed_slice_box(vertex_count),
            uv_scale_stride_index: bytemuck::zeroed_slice_box(vertex_count),
            flags: vec![FlagSet::default(); vertex_count].into_boxed_slice(),
            uv_scale_range: None,
        }
    }

    pub fn has(&self, vertex: usize, flag: VertexFlag) -> bool {
        self.flags[vertex].contains(flag)
    }

    fn decode_element(
        &mut self,
        v: usize,
        element: &VertexElement,
        raw: &[f64; 4],
        transform: &MeshTransform,
    ) {
        let scalar = element.scalar_type;
        let values = |normalized: bool| -> [f32; 4] {
            raw.map(|c| if normalized { scalar.normalize(c) } else { c as f32 })
        };

        match &element.semantic {
            Semantic::Position => {
                let p = Vec3::new(raw[0] as f32, raw[1] as f32, raw[2] as f32)
                    * transform.position_scale
                    + transform.position_offset;
                // x, y, z -> y, z, x
                self.position[v] = Vec3::new(p.y, p.z, p.x);
                self.position_w[v] = raw[3] as f32;
            }
            Semantic::Tangent => {
                let [x, y, z, w] = values(element.is_normalized);
                self.tangent[v] = Vec4::new(y, z, x, w);
            }
            Semantic::Normal => {
                let [x, y, z, _] = values(element.is_normalized);
                self.normal[v] = Vec3::new(y, z, x);

                let packed = NormalW::decode(raw[3]);
                self.dye_slot[v] = packed.dye_slot;
                self.uv_scale_stride_index[v] = packed.uv_scale_stride_index as u8;
                UvScaleRange::include(&mut self.uv_scale_range, packed.uv_scale_stride_index);
            }
            Semantic::Texcoord if element.semantic_index == 0 => {
                let [u, t, ..] = values(element.is_normalized);
                self.texcoord0[v] =
                    Vec2::new(u, t) * transform.texcoord_scale + transform.texcoord_offset;
            }
            Semantic::Texcoord if element.semantic_index == 2 => {
                let [u, t, ..] = values(element.is_normalized);
                self.texcoord2[v] = Vec2::new(u, t);
                self.flags[v] |= VertexFlag::Texcoord2;
            }
            Semantic::BlendIndices => {
                let [a, b, c, d] = values(false);
                self.blend_indices[v] = Vec4::new(a, b, c, d);
                self.flags[v] |= VertexFlag::BlendIndices;
            }
            Semantic::BlendWeight => {
                let [a, b, c, d] = raw.map(|c| ScalarType::UByte.normalize(c));
                self.blend_weight[v] = Vec4::new(a, b, c, d);
                self.flags[v] |= VertexFlag::BlendWeight;
            }
            // Other texcoord sets and unknown semantics are skipped so that
            // newer element kinds don't break decoding.
            Semantic::Texcoord | Semantic::Other(_) => {}
        }
    }

    /// Fills `color` from the data-driven buffer, four `ubyte` per record.
    pub fn apply_colors(&mut self, bytes: &[u8], record_count: usize) {
        let count = record_count.min(self.vertex_count);
        for (color, record) in self.color[..count].iter_mut().zip(bytes.chunks_exact(4)) {
            let [r, g, b, a] = [record[0], record[1], record[2], record[3]]
                .map(|c| ScalarType::UByte.normalize(c as f64));
            *color = Vec4::new(r, g, b, a);
        }
        if bytes.len() / 4 < count {
            log::warn!(
                "Color buffer holds {} records, expected {count}",
                bytes.len() / 4
            );
        }
    }

    /// Derives texcoord2 where the vertex data had none.
    ///
    /// Destiny 2 uses `texcoord0 * 4` for missing entries. Destiny copies
    /// texcoord0 into missing entries and stores present ones as a scale of
    /// texcoord0.
    pub fn apply_texcoord2_fallback(&mut self, game: Game) {
        for v in 0..self.vertex_count {
            let has_texcoord2 = self.has(v, VertexFlag::Texcoord2);
            let uv0 = self.texcoord0[v];

            match game {
                Game::Destiny2 if !has_texcoord2 => self.texcoord2[v] = uv0 * 4.0,
                Game::Destiny2 => {}
                Game::Destiny if !has_texcoord2 => self.texcoord2[v] = uv0,
                Game::Destiny => self.texcoord2[v] *= uv0,
            }
        }
    }
}

/// Decodes every vertex of every stream into fresh channels.
///
/// Streams are read stride by stride: vertex `v` of stream `s` starts at
/// `v * layouts[s].stride`.
pub fn decode_vertices(
    streams: &[VertexStream],
    vertex_count: usize,
    transform: &MeshTransform,
) -> TgxResult<DecodedVertexBuffers> {
    let mut buffers = DecodedVertexBuffers::zeroed(vertex_count);

    for v in 0..vertex_count {
        for (s, stream) in streams.iter().enumerate() {
            for element in &stream.layout.elements {
                let raw = stream.read(s, v, element)?;
                buffers.decode_element(v, element, &raw, transform);
            }
        }
    }

    match buffers.uv_scale_range {
        Some(range) if range.min != range.max => {
            log::debug!("UV scale stride index range {}..={}", range.min, range.max)
        }
        _ => log::debug!("No UV scales section"),
    }

    Ok(buffers)
}
