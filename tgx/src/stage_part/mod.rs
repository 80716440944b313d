use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Deserialize;

use crate::{
    config::{Game, LoaderConfig},
    index::{PartRange, PrimitiveType},
    metadata::{RenderMeshData, StagePartData},
};

pub const RENDER_STAGE_COUNT: usize = 24;

#[derive(Copy, Clone, FromPrimitive, Debug, PartialEq, Eq, Hash)]
pub enum RenderStage {
    GenerateGbuffer = 0,
    Decals = 1,
    InvestmentDecals = 2,
    ShadowGenerate = 3,
    LightingApply = 4,
    LightProbeApply = 5,
    DecalsAdditive = 6,
    Transparents = 7,
    Distortion = 8,
    LightShaftOcclusion = 9,
    SkinPrepass = 10,
    LensFlares = 11,
    DepthPrepass = 12,
    WaterReflection = 13,
    PostprocessTransparentStencil = 14,
    Impulse = 15,
    Reticle = 16,
    WaterRipples = 17,
    MaskSunLight = 18,
    Volumetrics = 19,
    Cubemaps = 20,
    PostprocessScreen = 21,
    WorldForces = 22,
    ComputeSkinning = 23,
}

impl RenderStage {
    pub fn from_index(index: usize) -> Option<Self> {
        Self::from_usize(index)
    }
}

/// `lod_category` of a stage part.
///
/// value | name
/// ------|-----------------
/// 0     | lod_category_0
/// 1     | lod_category_01
/// 2     | lod_category_012
/// 3     | lod_category_0123
/// 4     | lod_category_1
/// 5     | lod_category_12
/// 6     | lod_category_123
/// 7     | lod_category_2
/// 8     | lod_category_23
/// 9     | lod_category_3
/// 10    | lod_category_unused
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LodCategory {
    pub value: u32,
    #[serde(default)]
    pub name: String,
}

impl LodCategory {
    /// Category values drawn at each level of detail, 0 being the most detailed.
    const ACCEPTED: [&'static [u32]; 4] = [&[0, 1, 2, 3], &[1, 2, 3, 4, 5, 6], &[2, 3, 5, 6, 7, 8], &[3, 6, 8, 9]];

    pub fn accepts(&self, lod: u8) -> bool {
        Self::ACCEPTED
            .get(lod as usize)
            .is_some_and(|values| values.contains(&self.value))
    }
}

/// Dye channel selection derived from `gear_dye_change_color_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GearDye {
    pub slot: u8,
    pub use_primary_color: bool,
    pub use_investment_decal: bool,
}

impl Default for GearDye {
    fn default() -> Self {
        Self {
            slot: 0,
            use_primary_color: true,
            use_investment_decal: false,
        }
    }
}

impl GearDye {
    pub fn from_change_color_index(index: u32) -> Self {
        // Even indices use the primary colour, odd ones the secondary.
        let (slot, use_investment_decal) = match index {
            0 | 1 => (0, false),
            2 | 3 => (1, false),
            4 | 5 => (2, false),
            6 | 7 => (3, true),
            _ => {
                log::debug!("Unknown gear dye change color index {index}");
                return Self::default();
            }
        };
        Self {
            slot,
            use_primary_color: index % 2 == 0,
            use_investment_decal,
        }
    }
}

/// A stage part with its render stages resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePart {
    pub index: usize,
    pub start_index: usize,
    pub index_count: usize,
    pub primitive_type: u32,
    pub flags: u32,
    pub lod_category: LodCategory,
    pub gear_dye: GearDye,
    pub render_stages: Vec<RenderStage>,
}

impl StagePart {
    pub fn new(index: usize, data: &StagePartData) -> Self {
        Self {
            index,
            start_index: data.start_index,
            index_count: data.index_count,
            primitive_type: data.primitive_type,
            flags: data.flags,
            lod_category: data.lod_category.clone(),
            gear_dye: GearDye::from_change_color_index(data.gear_dye_change_color_index),
            render_stages: Vec::new(),
        }
    }

    /// All stage parts of a mesh. Part `p` is drawn in stage `s` when
    /// `stage_part_offsets[s] <= p < stage_part_offsets[s + 1]`.
    pub fn from_mesh(mesh: &RenderMeshData) -> Vec<Self> {
        let mut parts: Vec<_> = mesh
            .stage_part_list
            .iter()
            .enumerate()
            .map(|(i, data)| Self::new(i, data))
            .collect();

        for (s, bounds) in mesh.stage_part_offsets.windows(2).enumerate() {
            let Some(stage) = RenderStage::from_index(s) else {
                break;
            };
            let end = bounds[1].min(parts.len());
            for part in parts.iter_mut().take(end).skip(bounds[0]) {
                part.render_stages.push(stage);
            }
        }
        parts
    }

    pub fn range(&self) -> PartRange {
        PartRange {
            start: self.start_index,
            count: self.index_count,
        }
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        PrimitiveType::from_u32(self.primitive_type)
    }

    pub fn is_renderable(&self, config: &LoaderConfig) -> bool {
        let in_allowed_stage = || {
            self.render_stages
                .iter()
                .any(|stage| config.allowed_render_stages.contains(stage))
        };

        match config.game {
            Game::Destiny2 => {
                if !self.lod_category.accepts(config.lod) {
                    return false;
                }
                if self.flags == 0 {
                    log::debug!("Part {} has no flags, skipping", self.index);
                    return false;
                }
                in_allowed_stage()
            }
            // Older containers are always filtered at the highest detail.
            Game::Destiny => self.lod_category.accepts(0) && in_allowed_stage(),
        }
    }
}

/// Parts to draw for `config`, in stage part order.
pub fn filter_renderable<'a>(parts: &'a [StagePart], config: &LoaderConfig) -> Vec<&'a StagePart> {
    parts.iter().filter(|part| part.is_renderable(config)).collect()
}

#[cfg(test)]
mod stage_part_tests {
    use super::*;

    fn part(lod: u32, flags: u32) -> StagePartData {
        StagePartData {
            start_index: 0,
            index_count: 3,
            flags,
            primitive_type: 3,
            lod_category: LodCategory {
                value: lod,
                name: String::new(),
            },
            ..Default::default()
        }
    }

    fn mesh(parts: Vec<StagePartData>, offsets: Vec<usize>) -> RenderMeshData {
        RenderMeshData {
            stage_part_list: parts,
            stage_part_offsets: offsets,
            ..Default::default()
        }
    }

    #[test]
    fn lod_tables() {
        let cat = |value| LodCategory {
            value,
            name: String::new(),
        };
        assert!(cat(3).accepts(0));
        assert!(!cat(4).accepts(0));
        assert!(cat(4).accepts(1));
        assert!(cat(8).accepts(2));
        assert!(cat(9).accepts(3));
        assert!(!cat(0).accepts(3));
        assert!(!cat(0).accepts(4));
    }

    #[test]
    fn gear_dye_mapping() {
        assert_eq!(GearDye::from_change_color_index(0), GearDye::default());
        assert_eq!(
            GearDye::from_change_color_index(3),
            GearDye {
                slot: 1,
                use_primary_color: false,
                use_investment_decal: false
            }
        );
        assert_eq!(
            GearDye::from_change_color_index(6),
            GearDye {
                slot: 3,
                use_primary_color: true,
                use_investment_decal: true
            }
        );
        assert_eq!(
            GearDye::from_change_color_index(7),
            GearDye {
                slot: 3,
                use_primary_color: false,
                use_investment_decal: true
            }
        );
        assert_eq!(GearDye::from_change_color_index(42), GearDye::default());
    }

    #[test]
    fn stages_come_from_offsets() {
        // stage 0: parts 0..2, stage 1: none, stage 2: part 2, stage 3: part 2
        let mesh = mesh(
            vec![part(0, 1), part(0, 1), part(0, 1)],
            vec![0, 2, 2, 3, 4],
        );
        let parts = StagePart::from_mesh(&mesh);

        assert_eq!(parts[0].render_stages, vec![RenderStage::GenerateGbuffer]);
        assert_eq!(parts[1].render_stages, vec![RenderStage::GenerateGbuffer]);
        assert_eq!(
            parts[2].render_stages,
            vec![RenderStage::InvestmentDecals, RenderStage::ShadowGenerate]
        );
    }

    #[test]
    fn destiny2_filter() {
        // parts: ok, no flags, lod 9, shadow only
        let mesh = mesh(
            vec![part(0, 1), part(0, 0), part(9, 1), part(0, 1)],
            vec![0, 3, 3, 3, 4],
        );
        let parts = StagePart::from_mesh(&mesh);
        let config = LoaderConfig::default();

        let renderable: Vec<_> = filter_renderable(&parts, &config)
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(renderable, vec![0]);

        let config = LoaderConfig {
            lod: 3,
            ..LoaderConfig::default()
        };
        let renderable: Vec<_> = filter_renderable(&parts, &config)
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(renderable, vec![2]);
    }

    #[test]
    fn destiny_filter_ignores_flags_and_lod() {
        let mesh = mesh(vec![part(0, 0), part(9, 1)], vec![0, 2]);
        let parts = StagePart::from_mesh(&mesh);
        let config = LoaderConfig {
            game: Game::Destiny,
            lod: 3,
            ..LoaderConfig::default()
        };

        let renderable: Vec<_> = filter_renderable(&parts, &config)
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(renderable, vec![0]);
    }
}
