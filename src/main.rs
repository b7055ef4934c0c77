//! Command line front-end: enrich a tracks JSON file against a directory of
//! decoded frames.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pitch_tracks::{ArtifactCache, EnrichmentPipeline, Frame, PipelineConfig, Tracks};

#[derive(Parser, Debug)]
#[command(name = "pitch-tracks")]
#[command(about = "Add camera-stabilized positions, teams and ball possession to football tracks")]
struct Args {
    /// Raw tracks JSON (`players`, `referees`, `ball` per frame)
    #[arg(long, value_name = "PATH")]
    tracks: PathBuf,
    /// Directory of decoded frames, ordered by file name with digit runs
    /// compared numerically (`frame_2.png` before `frame_10.png`)
    #[arg(long, value_name = "DIR")]
    frames_dir: PathBuf,
    /// Enriched output JSON
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
    /// Pipeline configuration JSON; defaults are used for missing fields
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory for cached camera movements
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
    /// Stable cache key, defaults to the frames directory path
    #[arg(long)]
    cache_key: Option<String>,
}

fn main() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pitch_tracks=info"));
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let tracks_json = fs::read_to_string(&args.tracks)
        .with_context(|| format!("failed to read tracks {}", args.tracks.display()))?;
    let tracks: Tracks = serde_json::from_str(&tracks_json).context("failed to parse tracks JSON")?;

    let frames = read_frames(&args.frames_dir)?;
    info!(frames = frames.len(), dir = %args.frames_dir.display(), "frames loaded");

    let mut pipeline = EnrichmentPipeline::new(config);
    if let Some(dir) = &args.cache_dir {
        let key = args
            .cache_key
            .clone()
            .unwrap_or_else(|| args.frames_dir.display().to_string());
        pipeline = pipeline.with_cache(ArtifactCache::new(dir), key);
    }

    let enrichment = pipeline.run(&frames, tracks)?;

    let out = serde_json::to_string(&enrichment).context("failed to serialize output")?;
    fs::write(&args.output, out)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if let Some([one, two]) = enrichment.possession_share.last() {
        info!(
            team_one = format!("{:.2}%", one * 100.0),
            team_two = format!("{:.2}%", two * 100.0),
            "ball control"
        );
    }
    info!(output = %args.output.display(), "enriched tracks written");
    Ok(())
}

fn read_frames(dir: &Path) -> Result<Vec<Frame>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort_by_cached_key(|p| natural_key(p));
    if paths.is_empty() {
        bail!("no frame images found in {}", dir.display());
    }

    paths
        .iter()
        .map(|path| {
            let img = image::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?
                .to_rgb8();
            let (width, height) = img.dimensions();
            Frame::from_rgb(width as usize, height as usize, img.into_raw())
                .with_context(|| format!("unexpected pixel layout in {}", path.display()))
        })
        .collect()
}

/// Chunk of a file name; digit runs compare by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NameChunk {
    Number(u128),
    Text(String),
}

fn natural_key(path: &Path) -> Vec<NameChunk> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut chunks = Vec::new();
    let mut rest = name.as_str();
    while let Some(c) = rest.chars().next() {
        let is_digit = c.is_ascii_digit();
        let end = rest
            .find(|ch: char| ch.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        chunks.push(match head.parse() {
            Ok(n) if is_digit => NameChunk::Number(n),
            _ => NameChunk::Text(head.to_string()),
        });
        rest = tail;
    }
    chunks
}
