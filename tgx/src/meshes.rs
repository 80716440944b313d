use crate::{
    config::LoaderConfig,
    container::Container,
    error::{TgxError, TgxResult},
    index::{build_triangles, read_indices, TriangleList},
    metadata::{RenderMeshData, RenderMetadata},
    skin::{resolve_skin, Diagnostics, SkinBuffer, SkinTable},
    stage_part::{filter_renderable, StagePart},
    vertex::{decode_vertices, DecodedVertexBuffers, VertexStream},
};

/// A renderable stage part and its triangles.
#[derive(Debug, Clone)]
pub struct PartGeometry {
    pub part: StagePart,
    pub triangles: TriangleList,
}

/// Decoded geometry of one render mesh.
#[derive(Debug)]
pub struct RenderMeshGeometry {
    pub vertices: DecodedVertexBuffers,
    pub indices: Box<[u16]>,
    pub skin: Option<SkinTable>,
    /// Renderable parts whose triangles were built, in stage part order.
    pub parts: Vec<PartGeometry>,
    /// Renderable parts that failed, by stage part index.
    pub failed_parts: Vec<(usize, TgxError)>,
}

impl RenderMeshGeometry {
    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.triangles.len() / 3).sum()
    }
}

/// Decodes every render mesh described by the container's render metadata.
///
/// Only a missing or unreadable metadata file fails the call. Each render
/// mesh gets its own result, in metadata order, so a corrupt stream loses
/// that mesh alone. Parts are isolated the same way: a part with bad indices
/// lands in `failed_parts` and the rest still build.
pub fn build_meshes(
    container: &Container,
    config: &LoaderConfig,
    diagnostics: &mut impl Diagnostics,
) -> TgxResult<Vec<TgxResult<RenderMeshGeometry>>> {
    let metadata = RenderMetadata::from_container(container)?;

    let meshes = metadata
        .render_model
        .render_meshes
        .iter()
        .enumerate()
        .map(|(i, mesh)| {
            log::debug!("Building render mesh {i} of {:?}", container.identifier);
            let geometry = build_render_mesh(container, mesh, config, &mut *diagnostics);
            if let Err(err) = &geometry {
                log::warn!("Skipping render mesh {i}: {err}");
            }
            geometry
        })
        .collect();

    Ok(meshes)
}

pub fn build_render_mesh(
    container: &Container,
    mesh: &RenderMeshData,
    config: &LoaderConfig,
    diagnostics: &mut impl Diagnostics,
) -> TgxResult<RenderMeshGeometry> {
    let vertex_count = mesh.vertex_count()?;
    let layouts = mesh.layouts()?;
    let transform = mesh.transform(&layouts);

    let streams = mesh
        .vertex_buffers
        .iter()
        .zip(&layouts)
        .map(|(buffer, layout)| {
            Ok(VertexStream {
                layout,
                bytes: container.require(&buffer.file_name)?,
            })
        })
        .collect::<TgxResult<Vec<_>>>()?;

    let mut vertices = decode_vertices(&streams, vertex_count, &transform)?;
    log::debug!("Decoded {vertex_count} vertices from {} streams", streams.len());

    if let Some(buffer) = mesh.color_buffer() {
        vertices.apply_colors(container.require(&buffer.file_name)?, buffer.stride_count());
    }

    let skin_buffer = match mesh.skin_buffer() {
        Some(buffer) => Some(SkinBuffer {
            bytes: container.require(&buffer.file_name)?,
            stride_count: buffer.stride_count(),
        }),
        None => None,
    };
    let skin = resolve_skin(&mut vertices, skin_buffer, diagnostics);

    vertices.apply_texcoord2_fallback(config.game);

    let index_buffer = &mesh.index_buffer;
    let indices = read_indices(
        container.require(&index_buffer.file_name)?,
        index_buffer.byte_size,
        index_buffer.value_byte_size,
    )?;

    let stage_parts = StagePart::from_mesh(mesh);
    let mut parts = Vec::new();
    let mut failed_parts = Vec::new();

    for part in filter_renderable(&stage_parts, config) {
        let triangles = part
            .primitive()
            .ok_or(TgxError::UnsupportedPrimitive(part.primitive_type))
            .and_then(|primitive| build_triangles(&indices, part.range(), primitive, vertex_count));

        match triangles {
            Ok(triangles) => parts.push(PartGeometry {
                part: part.clone(),
                triangles,
            }),
            Err(err) => {
                log::warn!("Skipping part {}: {err}", part.index);
                failed_parts.push((part.index, err));
            }
        }
    }

    log::debug!(
        "{} of {} stage parts renderable, {} failed",
        parts.len(),
        stage_parts.len(),
        failed_parts.len()
    );

    Ok(RenderMeshGeometry {
        vertices,
        indices,
        skin,
        parts,
        failed_parts,
    })
}
