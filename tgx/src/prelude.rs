pub use crate::config::{Game, LoaderConfig};
pub use crate::container::{Container, Entry};
pub use crate::error::{TgxError, TgxResult};
pub use crate::index::{PartRange, PrimitiveType, TriangleList};
pub use crate::layout::{Layout, ScalarType, Semantic, VertexElement};
pub use crate::meshes::{build_meshes, PartGeometry, RenderMeshGeometry};
pub use crate::metadata::RenderMetadata;
pub use crate::skin::{Diagnostics, LogDiagnostics, SkinAnomaly, SkinTable};
pub use crate::stage_part::{RenderStage, StagePart};
pub use crate::vertex::{DecodedVertexBuffers, MeshTransform, VertexFlag};
