use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use ini::Ini;
use thiserror::Error;
use tgx::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "tgx-explorer", about = "Decode TGX geometry containers and print what they hold")]
struct Args {
    /// INI file with a [loader] section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured game, `destiny` or `destiny2`
    #[arg(long)]
    game: Option<String>,

    /// Overrides the configured level of detail
    #[arg(long)]
    lod: Option<i64>,

    /// Containers to decode
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum ExplorerError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{}: {source}", path.display())]
    Ini { path: PathBuf, source: ini::Error },

    #[error("{}: {source}", path.display())]
    Tgx { path: PathBuf, source: TgxError },

    #[error(transparent)]
    Config(#[from] TgxError),
}

fn load_config(args: &Args) -> Result<LoaderConfig, ExplorerError> {
    let mut config = match &args.config {
        Some(path) => {
            let ini = Ini::load_from_file(path).map_err(|source| ExplorerError::Ini {
                path: path.clone(),
                source,
            })?;
            LoaderConfig::from_ini(&ini)?
        }
        None => LoaderConfig::default(),
    };

    if let Some(game) = &args.game {
        config.game = game.parse()?;
    }
    if let Some(lod) = args.lod {
        config = LoaderConfig::new(config.game, lod, config.allowed_render_stages.iter().map(|&s| s as i64));
    }
    Ok(config)
}

/// Decodes one file and renders its readout.
fn explore(path: &Path, config: &LoaderConfig) -> Result<String, ExplorerError> {
    let bytes = std::fs::read(path).map_err(|source| ExplorerError::Io {
        path: path.to_owned(),
        source,
    })?;
    let tgx_err = |source| ExplorerError::Tgx {
        path: path.to_owned(),
        source,
    };

    let container = Container::parse(&bytes).map_err(tgx_err)?;

    let mut out = format!(
        "{} [{}] v{}, {} entries\n",
        path.display(),
        container.identifier,
        container.version,
        container.entry_count()
    );
    for entry in container.entries() {
        out += &format!(
            "  {:<32} offset {:>8} length {:>8}\n",
            entry.name, entry.byte_offset, entry.byte_length
        );
    }

    if container.entry(tgx::metadata::RENDER_METADATA_FILE).is_none() {
        out += "  no render metadata, not a geometry container\n";
        return Ok(out);
    }

    let mut anomalies: Vec<SkinAnomaly> = Vec::new();
    let meshes = build_meshes(&container, config, &mut anomalies).map_err(tgx_err)?;

    for (i, mesh) in meshes.iter().enumerate() {
        let mesh = match mesh {
            Ok(mesh) => mesh,
            Err(err) => {
                out += &format!("  mesh {i}: failed, {err}\n");
                continue;
            }
        };
        let range = match mesh.vertices.uv_scale_range {
            Some(r) => format!("{}..={}", r.min, r.max),
            None => "none".to_owned(),
        };
        out += &format!(
            "  mesh {i}: {} vertices, uv scales {range}, {} parts, {} triangles\n",
            mesh.vertices.vertex_count,
            mesh.parts.len(),
            mesh.triangle_count()
        );
        for part in &mesh.parts {
            out += &format!(
                "    part {:>3}: {:>6} triangles, lod {}, dye slot {}\n",
                part.part.index,
                part.triangles.len() / 3,
                part.part.lod_category.value,
                part.part.gear_dye.slot
            );
        }
        for (index, err) in &mesh.failed_parts {
            out += &format!("    part {index:>3}: failed, {err}\n");
        }
    }

    if !anomalies.is_empty() {
        out += &format!("  {} skin anomalies\n", anomalies.len());
        for anomaly in &anomalies {
            log::warn!("{}: {anomaly}", path.display());
        }
    }

    Ok(out)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Loading with {config:?}");

    // Files share nothing, decode each on its own thread.
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = args
            .files
            .iter()
            .map(|path| s.spawn(|| explore(path, &config)))
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut failed = false;
    for result in results {
        match result {
            Ok(Ok(readout)) => print!("{readout}"),
            Ok(Err(err)) => {
                log::error!("{err}");
                failed = true;
            }
            Err(_) => {
                log::error!("Decoder thread panicked");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
