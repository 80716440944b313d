//! Bone index and weight reconstruction from the single pass skin buffer.
//!
//! The skin buffer is an array of 4 byte records in two back to back sections
//! with no marker between them:
//!
//! ```text
//! [uv_min; uv_max]    uv scales, two half floats per record
//! [uv_max + 1; end)   bone records (i0, i1, w0, w1)
//!                     with no uv range the bone section starts at record 1
//!                     a four bone group spans two records (i0, i1, w0, w1)(i2, i3, w2, w3)
//! ```
//!
//! Both sections are parsed into one table of index/weight quads, with zero
//! quads standing in for uv records and for the second half of four bone
//! groups. Vertices find their quad at `group * 8 + offset`.

use std::fmt;

use glam::{Vec2, Vec4};

use crate::{
    binaries::BinaryData,
    layout::ScalarType,
    vertex::{BoneBinding, DecodedVertexBuffers, UvScaleRange, VertexFlag},
};

/// Quads reserved per bone group in the table.
pub const GROUP_STRIDE: usize = 8;

/// Raw weights of a populated quad add up to this.
pub const WEIGHT_SUM: u32 = 255;

/// Skin data that decodes, but not the way well formed assets do.
#[derive(Debug, Clone, PartialEq)]
pub enum SkinAnomaly {
    WeightSum { stride: usize, bones: u8, sum: u32 },
    UvSectionEnded { stride: usize },
    TruncatedFourBone { stride: usize },
    EmptyGroupScan { vertex: usize, group: usize },
    InvalidBoneGroup { vertex: usize, w: f32 },
    MissingUvScale { vertex: usize, stride_index: usize },
    TruncatedSkinBuffer { declared: usize, available: usize },
    UvSectionTruncated { stride: usize },
}

impl fmt::Display for SkinAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkinAnomaly::WeightSum { stride, bones, sum } => {
                write!(f, "{bones} bone weights at stride {stride} sum to {sum}, not {WEIGHT_SUM}")
            }
            SkinAnomaly::UvSectionEnded { stride } => write!(f, "UV stride ended at {stride}"),
            SkinAnomaly::TruncatedFourBone { stride } => {
                write!(f, "4 bone record at stride {stride} is missing its second half")
            }
            SkinAnomaly::EmptyGroupScan { vertex, group } => {
                write!(f, "vertex {vertex}: no weights left in bone group {group}")
            }
            SkinAnomaly::InvalidBoneGroup { vertex, w } => {
                write!(f, "vertex {vertex}: position.w {w} names no bone group")
            }
            SkinAnomaly::MissingUvScale { vertex, stride_index } => {
                write!(f, "vertex {vertex}: no uv scale at stride index {stride_index}")
            }
            SkinAnomaly::TruncatedSkinBuffer { declared, available } => {
                write!(f, "skin buffer declares {declared} strides but holds {available}")
            }
            SkinAnomaly::UvSectionTruncated { stride } => {
                write!(f, "skin buffer ends inside the uv section at stride {stride}")
            }
        }
    }
}

/// Receives anomalies found while resolving skin data.
pub trait Diagnostics {
    fn report(&mut self, anomaly: SkinAnomaly);
}

/// Forwards anomalies to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, anomaly: SkinAnomaly) {
        match anomaly {
            SkinAnomaly::WeightSum { .. } => log::error!("{anomaly}"),
            _ => log::warn!("{anomaly}"),
        }
    }
}

impl Diagnostics for Vec<SkinAnomaly> {
    fn report(&mut self, anomaly: SkinAnomaly) {
        self.push(anomaly);
    }
}

/// Decodes a half float the way the exporter encodes uv scales.
///
/// A stored exponent of 0 is read as 2^-14 with the implicit leading 1 kept,
/// so `0x0000` decodes to 2^-14 rather than 0.
pub fn half_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = match ((bits >> 10) & 0x1F) as i32 {
        0 => -14,
        e => e - 15,
    };
    let mantissa = (bits & 0x3FF) as f32;

    sign * 2f32.powi(exponent) * (1.0 + mantissa / 1024.0)
}

/// Shape of one bone record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideClass {
    /// All four bytes zero, padding.
    Empty,
    TwoBone,
    /// First half of a group, the next record holds bones 2 and 3.
    FourBone,
}

impl StrideClass {
    pub fn classify([i0, i1, w0, w1]: [u8; 4]) -> Self {
        if i0 == 0 && i1 == 0 && w0 == 0 && w1 == 0 {
            StrideClass::Empty
        } else if (w0 as u32 + w1 as u32) < WEIGHT_SUM {
            StrideClass::FourBone
        } else {
            StrideClass::TwoBone
        }
    }
}

/// A bone record found where uv scales were declared.
///
/// Requires `index > uv_max`, which the uv scan never reaches, so the
/// section always ends at `uv_max`.
pub fn is_uv_section_break(record: [u8; 4], index: usize, uv_max: usize) -> bool {
    record[0] != record[2] && record[2] as u32 + record[3] as u32 == WEIGHT_SUM && index > uv_max
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ScanningUv { index: usize },
    ScanningBones { index: usize },
    Done,
}

/// Running position inside the current bone group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GroupCursor {
    prev_group: usize,
    offset: usize,
}

/// Parsed skin buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinTable {
    pub uv_scales: Vec<Vec2>,
    pub blend_indices: Vec<[u8; 4]>,
    pub blend_weights: Vec<Vec4>,
    /// First record of the bone section when the uv section ended early, else 0.
    pub first_bone_stride: usize,
}

impl SkinTable {
    pub fn parse(
        records: &[[u8; 4]],
        uv_range: Option<UvScaleRange>,
        diagnostics: &mut impl Diagnostics,
    ) -> Self {
        let mut table = Self::default();

        let mut state = match uv_range {
            Some(range) => ScanState::ScanningUv {
                index: range.min as usize,
            },
            // record 0 is never a bone record, even without uv scales
            None => ScanState::ScanningBones { index: 1 },
        };
        let uv_max = uv_range.map_or(0, |r| r.max as usize);

        loop {
            state = match state {
                ScanState::ScanningUv { index } => table.scan_uv(records, index, uv_max, diagnostics),
                ScanState::ScanningBones { index } => table.scan_bones(records, index, diagnostics),
                ScanState::Done => break,
            };
        }

        log::debug!(
            "Skin table: {} uv scales, {} quads",
            table.uv_scales.len(),
            table.blend_indices.len()
        );
        table
    }

    fn push_quad(&mut self, indices: [u8; 4], weights: [u8; 4]) {
        let [a, b, c, d] = weights.map(|w| ScalarType::UByte.normalize(w as f64));
        self.blend_indices.push(indices);
        self.blend_weights.push(Vec4::new(a, b, c, d));
    }

    fn scan_uv(
        &mut self,
        records: &[[u8; 4]],
        index: usize,
        uv_max: usize,
        diagnostics: &mut impl Diagnostics,
    ) -> ScanState {
        if index > uv_max {
            return ScanState::ScanningBones { index: uv_max + 1 };
        }
        let Some(&record) = records.get(index) else {
            diagnostics.report(SkinAnomaly::UvSectionTruncated { stride: index });
            return ScanState::Done;
        };

        if is_uv_section_break(record, index, uv_max) {
            diagnostics.report(SkinAnomaly::UvSectionEnded { stride: index });
            self.first_bone_stride = index;
            return ScanState::ScanningBones { index };
        }

        let u = half_to_f32(u16::from_le_bytes([record[0], record[1]]));
        let v = half_to_f32(u16::from_le_bytes([record[2], record[3]]));
        self.uv_scales.push(Vec2::new(u, v));
        self.push_quad([0; 4], [0; 4]);

        ScanState::ScanningUv { index: index + 1 }
    }

    fn scan_bones(
        &mut self,
        records: &[[u8; 4]],
        index: usize,
        diagnostics: &mut impl Diagnostics,
    ) -> ScanState {
        let Some(&record) = records.get(index) else {
            return ScanState::Done;
        };
        let [i0, i1, w0, w1] = record;

        match StrideClass::classify(record) {
            StrideClass::Empty => {
                log::debug!("Empty stride {index}");
                self.push_quad([0; 4], [0; 4]);
                ScanState::ScanningBones { index: index + 1 }
            }
            StrideClass::TwoBone => {
                self.push_quad([i0, i1, 0, 0], [w0, w1, 0, 0]);
                check_sum(index, 2, &[w0, w1], diagnostics);
                ScanState::ScanningBones { index: index + 1 }
            }
            StrideClass::FourBone => {
                let Some(&[i2, i3, w2, w3]) = records.get(index + 1) else {
                    diagnostics.report(SkinAnomaly::TruncatedFourBone { stride: index });
                    return ScanState::Done;
                };
                self.push_quad([i0, i1, i2, i3], [w0, w1, w2, w3]);
                self.push_quad([0; 4], [0; 4]);
                check_sum(index, 4, &[w0, w1, w2, w3], diagnostics);
                ScanState::ScanningBones { index: index + 2 }
            }
        }
    }

    /// Writes bone indices and weights for every vertex, and texcoord2 for
    /// vertices whose uv-scale stride index falls in the uv section.
    pub fn assign(&self, buffers: &mut DecodedVertexBuffers, diagnostics: &mut impl Diagnostics) {
        let mut cursor = GroupCursor::default();

        for v in 0..buffers.vertex_count {
            let stride_index = buffers.uv_scale_stride_index[v] as usize;
            if stride_index < self.first_bone_stride && !buffers.has(v, VertexFlag::Texcoord2) {
                match self.uv_scales.get(stride_index) {
                    Some(&scale) => {
                        buffers.texcoord2[v] = buffers.texcoord0[v] * scale;
                        buffers.flags[v] |= VertexFlag::Texcoord2;
                    }
                    None => diagnostics.report(SkinAnomaly::MissingUvScale {
                        vertex: v,
                        stride_index,
                    }),
                }
            }

            match BoneBinding::decode(buffers.position_w[v]) {
                BoneBinding::SingleBone(bone) => {
                    buffers.blend_indices[v].x = bone;
                    buffers.blend_weight[v].x = 1.0;
                }
                BoneBinding::TwoBone { group } | BoneBinding::FourBone { group } => {
                    cursor = self.assign_group(buffers, v, group, cursor, diagnostics);
                }
                BoneBinding::Invalid(w) => {
                    diagnostics.report(SkinAnomaly::InvalidBoneGroup { vertex: v, w })
                }
            }
        }
    }

    fn assign_group(
        &self,
        buffers: &mut DecodedVertexBuffers,
        v: usize,
        group: usize,
        cursor: GroupCursor,
        diagnostics: &mut impl Diagnostics,
    ) -> GroupCursor {
        let mut offset = if cursor.prev_group == group {
            cursor.offset
        } else {
            0
        };
        let base = group.saturating_mul(GROUP_STRIDE);

        loop {
            let slot = base.saturating_add(offset);
            let Some(indices) = self.blend_indices.get(slot) else {
                diagnostics.report(SkinAnomaly::EmptyGroupScan { vertex: v, group });
                return GroupCursor {
                    prev_group: group,
                    offset,
                };
            };

            let bones = indices.iter().filter(|&&i| i > 0).count();
            if bones == 0 {
                log::trace!("Skipping empty stride {slot}");
                offset += 1;
                continue;
            }

            let [a, b, c, d] = indices.map(|i| i as f32);
            buffers.blend_indices[v] = Vec4::new(a, b, c, d);
            buffers.blend_weight[v] = self.blend_weights[slot];

            // A four bone quad is followed by its zero twin.
            offset += if bones > 2 { 2 } else { 1 };
            return GroupCursor {
                prev_group: group,
                offset,
            };
        }
    }
}

fn check_sum(stride: usize, bones: u8, weights: &[u8], diagnostics: &mut impl Diagnostics) {
    let sum: u32 = weights.iter().map(|&w| w as u32).sum();
    if sum != WEIGHT_SUM {
        diagnostics.report(SkinAnomaly::WeightSum { stride, bones, sum });
    }
}

/// The single pass skin vertex buffer of a mesh.
#[derive(Debug, Clone, Copy)]
pub struct SkinBuffer<'a> {
    pub bytes: &'a [u8],
    /// `byte_size / stride_byte_size` from metadata.
    pub stride_count: usize,
}

impl<'a> SkinBuffer<'a> {
    /// Records present in the buffer, at most `stride_count` of them.
    pub fn records(&self, diagnostics: &mut impl Diagnostics) -> &'a [[u8; 4]] {
        let available = self.bytes.len() / 4;
        if self.stride_count > available {
            diagnostics.report(SkinAnomaly::TruncatedSkinBuffer {
                declared: self.stride_count,
                available,
            });
        }
        <[u8; 4]>::view_array(self.bytes, 0, self.stride_count.min(available)).unwrap_or(&[])
    }
}

/// Skinning for meshes without a skin buffer: vertices with no blend data
/// bind to the bone in `position.w`, and vertices with indices but no
/// weights take two weights from the 3rd and 4th index bytes.
pub fn apply_fallback(buffers: &mut DecodedVertexBuffers) {
    for v in 0..buffers.vertex_count {
        let indices = buffers.has(v, VertexFlag::BlendIndices);
        let weights = buffers.has(v, VertexFlag::BlendWeight);

        if !indices && !weights {
            buffers.blend_indices[v].x = buffers.position_w[v];
            buffers.blend_weight[v].x = 1.0;
        } else if indices && !weights {
            let packed = buffers.blend_indices[v];
            buffers.blend_weight[v].x = packed.z / 255.0;
            buffers.blend_weight[v].y = packed.w / 255.0;
        }
    }
}

/// Resolves bone indices and weights in place. Returns the parsed table when
/// a skin buffer was given.
pub fn resolve_skin(
    buffers: &mut DecodedVertexBuffers,
    skin: Option<SkinBuffer>,
    diagnostics: &mut impl Diagnostics,
) -> Option<SkinTable> {
    let Some(skin) = skin else {
        log::debug!("No skin buffer, assigning 1 and 2 bone weights only");
        apply_fallback(buffers);
        return None;
    };

    let records = skin.records(diagnostics);
    let table = SkinTable::parse(records, buffers.uv_scale_range, diagnostics);
    table.assign(buffers, diagnostics);
    Some(table)
}

#[cfg(test)]
mod skin_tests {
    use super::*;

    fn close(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-3
    }

    fn skinned(position_w: &[f32]) -> DecodedVertexBuffers {
        let mut buffers = DecodedVertexBuffers::zeroed(position_w.len());
        buffers.position_w.copy_from_slice(position_w);
        buffers
    }

    fn flat(records: &[[u8; 4]]) -> Vec<u8> {
        records.concat()
    }

    /// Skin bytes for a mesh without uv scales, where record 0 is skipped.
    fn bone_section(records: &[[u8; 4]]) -> (Vec<u8>, usize) {
        let mut bytes = vec![0xEE; 4];
        bytes.extend(flat(records));
        (bytes, records.len() + 1)
    }

    #[test]
    fn half_floats() {
        assert_eq!(half_to_f32(0x3C00), 1.0);
        assert_eq!(half_to_f32(0x4000), 2.0);
        assert_eq!(half_to_f32(0xC000), -2.0);
        assert_eq!(half_to_f32(0x3800), 0.5);
        assert_eq!(half_to_f32(0x3E00), 1.5);
        // exponent 0 keeps the implicit 1
        assert_eq!(half_to_f32(0x0000), 2f32.powi(-14));
    }

    #[test]
    fn classifies_strides() {
        assert_eq!(StrideClass::classify([0, 0, 0, 0]), StrideClass::Empty);
        assert_eq!(StrideClass::classify([5, 9, 100, 155]), StrideClass::TwoBone);
        assert_eq!(StrideClass::classify([3, 4, 50, 80]), StrideClass::FourBone);
        assert_eq!(StrideClass::classify([0, 0, 255, 0]), StrideClass::TwoBone);
    }

    #[test]
    fn uv_break_needs_index_past_max() {
        assert!(!is_uv_section_break([1, 0, 100, 155], 3, 3));
        assert!(is_uv_section_break([1, 0, 100, 155], 4, 3));
        assert!(!is_uv_section_break([100, 0, 100, 155], 4, 3));
        assert!(!is_uv_section_break([1, 0, 100, 154], 4, 3));
    }

    #[test]
    fn two_bone_record() {
        let (bytes, stride_count) = bone_section(&[[5, 9, 100, 155]]);
        let mut buffers = skinned(&[2048.0]);
        let mut anomalies = Vec::new();

        resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count }),
            &mut anomalies,
        );

        assert_eq!(buffers.blend_indices[0], Vec4::new(5.0, 9.0, 0.0, 0.0));
        assert!(close(buffers.blend_weight[0], Vec4::new(0.392, 0.608, 0.0, 0.0)));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn four_bone_record_pair() {
        let (bytes, stride_count) = bone_section(&[[3, 4, 50, 80], [6, 7, 60, 65]]);
        let mut buffers = skinned(&[-2048.0]);
        let mut anomalies = Vec::new();

        let table = resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count }),
            &mut anomalies,
        )
        .unwrap();

        assert_eq!(table.blend_indices, vec![[3, 4, 6, 7], [0; 4]]);
        assert_eq!(buffers.blend_indices[0], Vec4::new(3.0, 4.0, 6.0, 7.0));
        let expected = Vec4::new(50.0, 80.0, 60.0, 65.0) / 255.0;
        assert!(close(buffers.blend_weight[0], expected));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn uv_section_precedes_bones() {
        // uv stride indices 0..=1, so bones start at record 2
        let bytes = flat(&[[0x00, 0x3C, 0x00, 0x40], [0x00, 0x38, 0x00, 0x3C], [5, 9, 100, 155]]);
        let mut buffers = skinned(&[2048.0]);
        buffers.uv_scale_range = Some(UvScaleRange { min: 0, max: 1 });
        let mut anomalies = Vec::new();

        let table = resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count: 3 }),
            &mut anomalies,
        )
        .unwrap();

        assert_eq!(table.uv_scales, vec![Vec2::new(1.0, 2.0), Vec2::new(0.5, 1.0)]);
        assert_eq!(table.blend_indices.len(), 3);
        assert_eq!(table.first_bone_stride, 0);
        // group 0 skips the two zero quads of the uv section
        assert_eq!(buffers.blend_indices[0], Vec4::new(5.0, 9.0, 0.0, 0.0));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn cursor_walks_and_resets_per_group() {
        // group 0: two bone, four bone + twin, two bone; group 1 starts at slot 8
        let mut records = vec![
            [1, 2, 200, 55],
            [3, 4, 50, 80],
            [6, 7, 60, 65],
            [8, 9, 128, 127],
        ];
        records.extend([[0; 4]; 4]);
        records.push([10, 11, 255, 0]);
        let (bytes, stride_count) = bone_section(&records);

        let mut buffers = skinned(&[2048.0, -2048.0, 2048.0, 2049.0, 2048.0, 12.0]);
        let mut anomalies = Vec::new();
        resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count }),
            &mut anomalies,
        );

        assert_eq!(buffers.blend_indices[0], Vec4::new(1.0, 2.0, 0.0, 0.0));
        assert_eq!(buffers.blend_indices[1], Vec4::new(3.0, 4.0, 6.0, 7.0));
        assert_eq!(buffers.blend_indices[2], Vec4::new(8.0, 9.0, 0.0, 0.0));
        assert_eq!(buffers.blend_indices[3], Vec4::new(10.0, 11.0, 0.0, 0.0));
        // back in group 0 after group 1, the cursor starts over
        assert_eq!(buffers.blend_indices[4], Vec4::new(1.0, 2.0, 0.0, 0.0));
        assert_eq!(buffers.blend_indices[5], Vec4::new(12.0, 0.0, 0.0, 0.0));
        assert_eq!(buffers.blend_weight[5], Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn reports_anomalies() {
        let (bytes, stride_count) = bone_section(&[[5, 9, 200, 100], [3, 4, 50, 80]]);
        let mut buffers = skinned(&[2049.0, 300.0]);
        let mut anomalies = Vec::new();

        resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count }),
            &mut anomalies,
        );

        assert_eq!(
            anomalies,
            vec![
                SkinAnomaly::WeightSum { stride: 1, bones: 2, sum: 300 },
                SkinAnomaly::TruncatedFourBone { stride: 2 },
                SkinAnomaly::EmptyGroupScan { vertex: 0, group: 1 },
                SkinAnomaly::InvalidBoneGroup { vertex: 1, w: 300.0 },
            ]
        );
        // nothing was found, the vertex keeps its decoded blend data
        assert_eq!(buffers.blend_indices[0], Vec4::ZERO);
    }

    #[test]
    fn four_bone_sum_is_checked() {
        let (bytes, stride_count) = bone_section(&[[3, 4, 50, 80], [6, 7, 60, 60]]);
        let mut anomalies = Vec::new();
        let records = SkinBuffer { bytes: &bytes, stride_count }.records(&mut anomalies);
        SkinTable::parse(records, None, &mut anomalies);
        assert_eq!(
            anomalies,
            vec![SkinAnomaly::WeightSum { stride: 1, bones: 4, sum: 250 }]
        );
    }

    #[test]
    fn bones_start_at_record_1_without_uv_range() {
        let bytes = flat(&[[1, 2, 128, 127], [5, 9, 100, 155]]);
        let mut buffers = skinned(&[2048.0]);
        let mut anomalies = Vec::new();

        let table = resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count: 2 }),
            &mut anomalies,
        )
        .unwrap();

        assert_eq!(table.blend_indices, vec![[5, 9, 0, 0]]);
        assert_eq!(table.first_bone_stride, 0);
        assert_eq!(buffers.blend_indices[0], Vec4::new(5.0, 9.0, 0.0, 0.0));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn declared_strides_are_clamped_to_bytes() {
        let bytes = flat(&[[5, 9, 100, 155]]);
        let skin = SkinBuffer { bytes: &bytes, stride_count: 5 };
        let mut anomalies = Vec::new();

        assert_eq!(skin.records(&mut anomalies).len(), 1);
        assert_eq!(
            anomalies,
            vec![SkinAnomaly::TruncatedSkinBuffer { declared: 5, available: 1 }]
        );
    }

    #[test]
    fn short_uv_section_is_reported() {
        let bytes = flat(&[[0x00, 0x3C, 0x00, 0x3C]]);
        let mut buffers = skinned(&[0.0]);
        buffers.uv_scale_range = Some(UvScaleRange { min: 0, max: 2 });
        let mut anomalies = Vec::new();

        let table = resolve_skin(
            &mut buffers,
            Some(SkinBuffer { bytes: &bytes, stride_count: 1 }),
            &mut anomalies,
        )
        .unwrap();

        assert_eq!(table.uv_scales.len(), 1);
        assert_eq!(anomalies, vec![SkinAnomaly::UvSectionTruncated { stride: 1 }]);
    }

    #[test]
    fn fallback_without_skin_buffer() {
        let mut buffers = skinned(&[7.0, 2048.0, 3.0]);
        buffers.blend_indices[1] = Vec4::new(1.0, 2.0, 51.0, 204.0);
        buffers.flags[1] |= VertexFlag::BlendIndices;
        buffers.blend_weight[2] = Vec4::new(0.5, 0.5, 0.0, 0.0);
        buffers.flags[2] |= VertexFlag::BlendIndices | VertexFlag::BlendWeight;

        let mut anomalies = Vec::new();
        assert!(resolve_skin(&mut buffers, None, &mut anomalies).is_none());

        assert_eq!(buffers.blend_indices[0], Vec4::new(7.0, 0.0, 0.0, 0.0));
        assert_eq!(buffers.blend_weight[0], Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert!(close(buffers.blend_weight[1], Vec4::new(0.2, 0.8, 0.0, 0.0)));
        assert_eq!(buffers.blend_weight[2], Vec4::new(0.5, 0.5, 0.0, 0.0));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn log_diagnostics_accepts_everything() {
        let mut diagnostics = LogDiagnostics;
        diagnostics.report(SkinAnomaly::UvSectionEnded { stride: 3 });
        assert_eq!(
            SkinAnomaly::EmptyGroupScan { vertex: 1, group: 2 }.to_string(),
            "vertex 1: no weights left in bone group 2"
        );
    }
}
