use std::{fmt, str::FromStr};

use ini::Ini;

use crate::{
    error::{TgxError, TgxResult},
    stage_part::{RenderStage, RENDER_STAGE_COUNT},
};

pub const DEFAULT_LOD: u8 = 0;
pub const MAX_LOD: u8 = 3;

/// Stages drawn unless configured otherwise.
pub const DEFAULT_RENDER_STAGES: [RenderStage; 5] = [
    RenderStage::GenerateGbuffer,
    RenderStage::Decals,
    RenderStage::InvestmentDecals,
    RenderStage::DecalsAdditive,
    RenderStage::Transparents,
];

/// Game generation a container was exported from. Selects the texcoord2
/// fallback and the stage part filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Game {
    Destiny,
    #[default]
    Destiny2,
}

impl FromStr for Game {
    type Err = TgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "destiny" => Ok(Game::Destiny),
            "destiny2" => Ok(Game::Destiny2),
            _ => Err(TgxError::UnsupportedGame(s.to_owned())),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Game::Destiny => "destiny",
            Game::Destiny2 => "destiny2",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub game: Game,
    /// Level of detail, `0..=3`, 0 being the most detailed.
    pub lod: u8,
    pub allowed_render_stages: Vec<RenderStage>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            game: Game::default(),
            lod: DEFAULT_LOD,
            allowed_render_stages: DEFAULT_RENDER_STAGES.to_vec(),
        }
    }
}

impl LoaderConfig {
    /// Out of range values are replaced rather than rejected: a bad LOD falls
    /// back to [`DEFAULT_LOD`] and unknown stage indices are dropped.
    pub fn new(game: Game, lod: i64, render_stages: impl IntoIterator<Item = i64>) -> Self {
        let lod = match u8::try_from(lod) {
            Ok(lod) if lod <= MAX_LOD => lod,
            _ => {
                log::warn!("LOD {lod} is out of range, using {DEFAULT_LOD}");
                DEFAULT_LOD
            }
        };

        let allowed_render_stages = render_stages
            .into_iter()
            .filter_map(|index| {
                let stage = usize::try_from(index)
                    .ok()
                    .filter(|&i| i < RENDER_STAGE_COUNT)
                    .and_then(RenderStage::from_index);
                if stage.is_none() {
                    log::warn!("Ignoring render stage {index}");
                }
                stage
            })
            .collect();

        Self {
            game,
            lod,
            allowed_render_stages,
        }
    }

    /// Reads the `[loader]` section:
    ///
    /// ```ini
    /// [loader]
    /// game = destiny2
    /// lod = 0
    /// render_stages = 0, 1, 2, 6, 7
    /// ```
    ///
    /// Missing keys keep their defaults.
    pub fn from_ini(ini: &Ini) -> TgxResult<Self> {
        let Some(section) = ini.section(Some("loader")) else {
            return Ok(Self::default());
        };

        let game = match section.get("game") {
            Some(game) => game.parse()?,
            None => Game::default(),
        };

        let lod = match section.get("lod") {
            Some(lod) => parse_int("lod", lod)?,
            None => DEFAULT_LOD as i64,
        };

        let stages = match section.get("render_stages") {
            Some(stages) => stages
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_int("render_stages", s))
                .collect::<TgxResult<Vec<_>>>()?,
            None => DEFAULT_RENDER_STAGES.iter().map(|&s| s as i64).collect(),
        };

        Ok(Self::new(game, lod, stages))
    }
}

fn parse_int(key: &str, value: &str) -> TgxResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| TgxError::Config(format!("{key} = {value:?} is not an integer")))
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn parses_games() {
        assert_eq!("destiny".parse::<Game>().unwrap(), Game::Destiny);
        assert_eq!("Destiny2".parse::<Game>().unwrap(), Game::Destiny2);
        assert!(matches!(
            "halo".parse::<Game>(),
            Err(TgxError::UnsupportedGame(g)) if g == "halo"
        ));
    }

    #[test]
    fn defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.game, Game::Destiny2);
        assert_eq!(config.lod, 0);
        assert_eq!(config.allowed_render_stages, DEFAULT_RENDER_STAGES);
    }

    #[test]
    fn validates_values() {
        let config = LoaderConfig::new(Game::Destiny, 7, [0, -1, 7, 24, 23]);
        assert_eq!(config.lod, DEFAULT_LOD);
        assert_eq!(
            config.allowed_render_stages,
            vec![RenderStage::GenerateGbuffer, RenderStage::Transparents, RenderStage::ComputeSkinning]
        );
        assert_eq!(LoaderConfig::new(Game::Destiny2, 2, []).lod, 2);
        assert_eq!(LoaderConfig::new(Game::Destiny2, -1, []).lod, DEFAULT_LOD);
    }

    #[test]
    fn reads_ini() {
        let ini = Ini::load_from_str("[loader]\ngame = destiny\nlod = 1\nrender_stages = 0, 7\n").unwrap();
        let config = LoaderConfig::from_ini(&ini).unwrap();
        assert_eq!(config.game, Game::Destiny);
        assert_eq!(config.lod, 1);
        assert_eq!(
            config.allowed_render_stages,
            vec![RenderStage::GenerateGbuffer, RenderStage::Transparents]
        );

        let empty = Ini::load_from_str("").unwrap();
        assert_eq!(LoaderConfig::from_ini(&empty).unwrap(), LoaderConfig::default());

        let bad = Ini::load_from_str("[loader]\nlod = high\n").unwrap();
        assert!(matches!(LoaderConfig::from_ini(&bad), Err(TgxError::Config(_))));
    }
}
