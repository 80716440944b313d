//! The `render_metadata.js` sidecar, reduced to what geometry decoding reads.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::{
    container::Container,
    error::{TgxError, TgxResult},
    layout::{ElementDescription, Layout},
    stage_part::LodCategory,
    vertex::MeshTransform,
};

pub const RENDER_METADATA_FILE: &str = "render_metadata.js";

#[derive(Debug, Clone, Deserialize)]
pub struct RenderMetadata {
    pub render_model: RenderModel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderModel {
    #[serde(default)]
    pub render_meshes: Vec<RenderMeshData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderMeshData {
    #[serde(default)]
    pub position_offset: Vec<f32>,
    #[serde(default)]
    pub position_scale: Vec<f32>,
    /// `[scale_u, scale_v, offset_u, offset_v]`
    #[serde(default)]
    pub texcoord0_scale_offset: Vec<f32>,
    pub index_buffer: IndexBufferData,
    pub vertex_buffers: Vec<BufferData>,
    #[serde(default)]
    pub single_pass_skin_vertex_buffer: Option<BufferData>,
    #[serde(default)]
    pub data_driven_vertex_buffer: Option<BufferData>,
    #[serde(default)]
    pub stage_part_list: Vec<StagePartData>,
    #[serde(default)]
    pub stage_part_offsets: Vec<usize>,
    #[serde(default)]
    pub stage_part_vertex_stream_layout_definitions: Vec<LayoutDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BufferData {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub byte_size: usize,
    #[serde(default)]
    pub stride_byte_size: usize,
}

impl BufferData {
    /// Metadata writes absent buffers as records with an empty file name.
    pub fn is_present(&self) -> bool {
        !self.file_name.is_empty()
    }

    /// Number of whole strides, 0 for a zero stride.
    pub fn stride_count(&self) -> usize {
        self.byte_size.checked_div(self.stride_byte_size).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IndexBufferData {
    pub file_name: String,
    pub byte_size: usize,
    pub value_byte_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutDefinition {
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamFormat {
    #[serde(default)]
    pub elements: Vec<ElementDescription>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StagePartData {
    pub start_index: usize,
    pub index_count: usize,
    #[serde(default)]
    pub index_min: u32,
    #[serde(default)]
    pub index_max: u32,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub gear_dye_change_color_index: u32,
    #[serde(default)]
    pub variant_shader_index: i32,
    pub primitive_type: u32,
    #[serde(default)]
    pub lod_category: LodCategory,
    #[serde(default)]
    pub lod_run: u32,
}

impl RenderMetadata {
    pub fn parse(bytes: &[u8]) -> TgxResult<Self> {
        // Some containers pad the sidecar with NULs.
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
        Ok(serde_json::from_slice(&bytes[..end])?)
    }

    pub fn from_container(container: &Container) -> TgxResult<Self> {
        Self::parse(container.require(RENDER_METADATA_FILE)?)
    }
}

impl RenderMeshData {
    /// Vertex count implied by the first vertex buffer.
    pub fn vertex_count(&self) -> TgxResult<usize> {
        let first = self
            .vertex_buffers
            .first()
            .ok_or_else(|| TgxError::InvalidLayout("render mesh has no vertex buffers".to_owned()))?;

        if first.stride_byte_size == 0 {
            return Err(TgxError::InvalidLayout(format!(
                "vertex buffer {:?} has a zero stride",
                first.file_name
            )));
        }
        Ok(first.stride_count())
    }

    /// One layout per vertex buffer, from the first layout definition.
    pub fn layouts(&self) -> TgxResult<Vec<Layout>> {
        let definition = self
            .stage_part_vertex_stream_layout_definitions
            .first()
            .ok_or_else(|| TgxError::InvalidLayout("no vertex stream layout definition".to_owned()))?;

        self.vertex_buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| {
                let format = definition.formats.get(i).ok_or_else(|| {
                    TgxError::InvalidLayout(format!("no stream format for vertex buffer {i}"))
                })?;
                Layout::from_descriptions(buffer.stride_byte_size, &format.elements)
            })
            .collect()
    }

    /// Position and texcoord0 transforms. Meshes that store float positions
    /// are already in model space and keep an identity position transform.
    pub fn transform(&self, layouts: &[Layout]) -> MeshTransform {
        let mut transform = MeshTransform {
            position_scale: vec3_or(&self.position_scale, Vec3::ONE),
            position_offset: vec3_or(&self.position_offset, Vec3::ZERO),
            texcoord_scale: vec2_or(self.texcoord0_scale_offset.get(..2), Vec2::ONE),
            texcoord_offset: vec2_or(self.texcoord0_scale_offset.get(2..4), Vec2::ZERO),
        };

        if layouts.iter().any(Layout::position_is_float) {
            transform.position_scale = Vec3::ONE;
            transform.position_offset = Vec3::ZERO;
        }
        transform
    }

    pub fn skin_buffer(&self) -> Option<&BufferData> {
        self.single_pass_skin_vertex_buffer
            .as_ref()
            .filter(|b| b.is_present())
    }

    pub fn color_buffer(&self) -> Option<&BufferData> {
        self.data_driven_vertex_buffer
            .as_ref()
            .filter(|b| b.is_present())
    }
}

fn vec3_or(values: &[f32], default: Vec3) -> Vec3 {
    match values {
        [x, y, z, ..] => Vec3::new(*x, *y, *z),
        _ => default,
    }
}

fn vec2_or(values: Option<&[f32]>, default: Vec2) -> Vec2 {
    match values {
        Some([u, v]) => Vec2::new(*u, *v),
        _ => default,
    }
}
