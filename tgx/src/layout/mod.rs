use serde::Deserialize;

use crate::error::{TgxError, TgxResult};

const SEMANTIC_PREFIX: &str = "_tfx_vb_semantic_";
const FORMAT_PREFIX: &str = "_vertex_format_attribute_";

/// Scalar storage type of one vertex element component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Float,
}

impl ScalarType {
    // Longest names first so that no name shadows a longer one sharing its prefix.
    const NAMES: [(&'static str, ScalarType); 7] = [
        ("ushort", ScalarType::UShort),
        ("ubyte", ScalarType::UByte),
        ("short", ScalarType::Short),
        ("float", ScalarType::Float),
        ("byte", ScalarType::Byte),
        ("uint", ScalarType::UInt),
        ("int", ScalarType::Int),
    ];

    pub fn byte_size(self) -> usize {
        match self {
            ScalarType::Byte | ScalarType::UByte => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ScalarType::Byte | ScalarType::Short | ScalarType::Int)
    }

    /// Largest representable value, the divisor of fixed-point normalization.
    /// `None` for floats, which are never normalized.
    pub fn max_value(self) -> Option<f64> {
        match self {
            ScalarType::Byte => Some(i8::MAX as f64),
            ScalarType::UByte => Some(u8::MAX as f64),
            ScalarType::Short => Some(i16::MAX as f64),
            ScalarType::UShort => Some(u16::MAX as f64),
            ScalarType::Int => Some(i32::MAX as f64),
            ScalarType::UInt => Some(u32::MAX as f64),
            ScalarType::Float => None,
        }
    }

    /// Maps a stored integer onto `[-1, 1]` (signed) or `[0, 1]` (unsigned).
    pub fn normalize(self, value: f64) -> f32 {
        match self.max_value() {
            Some(max) if self.is_signed() => (value / max).max(-1.0) as f32,
            Some(max) => (value / max) as f32,
            None => value as f32,
        }
    }

    /// Reads one little-endian scalar from the start of `bytes`.
    pub fn read(self, bytes: &[u8]) -> Option<f64> {
        let value = match self {
            ScalarType::Byte => *bytes.first()? as i8 as f64,
            ScalarType::UByte => *bytes.first()? as f64,
            ScalarType::Short => i16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as f64,
            ScalarType::UShort => u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as f64,
            ScalarType::Int => i32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64,
            ScalarType::UInt => u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64,
            ScalarType::Float => f32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64,
        };
        Some(value)
    }

    /// Splits a format name such as `"ubyte4"` or `"float3"` into its scalar
    /// type and component count.
    pub fn parse_format(name: &str) -> TgxResult<(ScalarType, u8)> {
        let name = name.strip_prefix(FORMAT_PREFIX).unwrap_or(name);
        let unrecognized = || TgxError::UnrecognizedElementFormat(name.to_owned());

        let (scalar, digits) = Self::NAMES
            .iter()
            .find_map(|&(prefix, scalar)| Some((scalar, name.strip_prefix(prefix)?)))
            .ok_or_else(unrecognized)?;

        match digits.parse::<u8>() {
            Ok(count @ 1..=4) => Ok((scalar, count)),
            _ => Err(unrecognized()),
        }
    }
}

/// Logical role of a vertex element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    Texcoord,
    BlendIndices,
    BlendWeight,
    /// Anything else. Kept so layouts still add up, never decoded.
    Other(String),
}

impl Semantic {
    pub fn from_name(name: &str) -> Self {
        match name.strip_prefix(SEMANTIC_PREFIX).unwrap_or(name) {
            "position" => Semantic::Position,
            "normal" => Semantic::Normal,
            "tangent" => Semantic::Tangent,
            "texcoord" => Semantic::Texcoord,
            "blendindices" => Semantic::BlendIndices,
            "blendweight" => Semantic::BlendWeight,
            other => Semantic::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexElement {
    pub semantic: Semantic,
    pub semantic_index: u8,
    pub scalar_type: ScalarType,
    pub component_count: u8,
    pub is_normalized: bool,
    pub byte_offset: u16,
}

impl VertexElement {
    pub fn byte_size(&self) -> usize {
        self.scalar_type.byte_size() * self.component_count as usize
    }

    fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.byte_offset as usize;
        start..start + self.byte_size()
    }
}

/// One element entry of a stream format as it appears in render metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementDescription {
    pub semantic: String,
    #[serde(default)]
    pub semantic_index: u8,
    #[serde(rename = "type")]
    pub format: String,
    #[serde(default)]
    pub normalized: bool,
}

/// How one vertex stream stride is carved into elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub stride: usize,
    pub elements: Vec<VertexElement>,
}

impl Layout {
    /// Checks that the elements neither overlap nor leave the stride.
    pub fn new(stride: usize, elements: Vec<VertexElement>) -> TgxResult<Self> {
        let mut ranges: Vec<_> = elements.iter().map(VertexElement::byte_range).collect();
        ranges.sort_by_key(|r| r.start);

        if let Some(last) = ranges.last() {
            if last.end > stride {
                return Err(TgxError::InvalidLayout(format!(
                    "element {last:?} does not fit a {stride} byte stride"
                )));
            }
        }
        for pair in ranges.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(TgxError::InvalidLayout(format!(
                    "elements {:?} and {:?} overlap",
                    pair[0], pair[1]
                )));
            }
        }

        Ok(Self { stride, elements })
    }

    /// Builds a layout from metadata element descriptions, packing elements
    /// back to back in declaration order.
    pub fn from_descriptions(stride: usize, descriptions: &[ElementDescription]) -> TgxResult<Self> {
        let mut elements: Vec<VertexElement> = Vec::with_capacity(descriptions.len());
        let mut offset = 0usize;

        for description in descriptions {
            let (scalar_type, component_count) = ScalarType::parse_format(&description.format)?;
            let semantic = Semantic::from_name(&description.semantic);

            if elements
                .iter()
                .any(|e| e.semantic == semantic && e.semantic_index == description.semantic_index)
            {
                log::warn!(
                    "Duplicate vertex element {semantic:?}{}",
                    description.semantic_index
                );
            }

            let byte_offset = u16::try_from(offset).map_err(|_| {
                TgxError::InvalidLayout(format!("element offset {offset} exceeds u16"))
            })?;

            let element = VertexElement {
                semantic,
                semantic_index: description.semantic_index,
                scalar_type,
                component_count,
                is_normalized: description.normalized,
                byte_offset,
            };
            offset += element.byte_size();
            elements.push(element);
        }

        Self::new(stride, elements)
    }

    /// Float positions are already in model space and must not be rescaled.
    pub fn position_is_float(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.semantic == Semantic::Position && e.scalar_type == ScalarType::Float)
    }
}
