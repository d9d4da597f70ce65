//! `inkgroup`: offline driver for the stroke grouping engine.
//!
//! Reads a JSON array of strokes (a file, or `-` for stdin) and prints the
//! grouping, the per-stroke features, or the score breakdown for one pair.
//! Settings default to the `INKGROUP_*` environment variables.

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Read};

use clap::{Parser, Subcommand, ValueEnum};
use inkgroup::cluster::SessionThresholds;
use inkgroup::features::{StrokeFeatures, extract_features};
use inkgroup::scoring::{score_pair, temporal_delta_ms};
use inkgroup::{GroupingSettings, Layer, ServiceConfig, SettingsError, Stroke, recompute};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("no stroke with id `{0}` on the selected layer")]
    UnknownStroke(String),
    #[error("stroke `{0}` has no points")]
    EmptyStroke(String),
}

#[derive(Parser, Debug)]
#[command(name = "inkgroup", about = "Group freehand strokes into objects")]
struct Cli {
    /// JSON stroke array to read; `-` reads stdin. A repeated stroke id
    /// keeps its first occurrence.
    #[arg(long, short, global = true, default_value = "-")]
    input: String,

    /// Layer to group; strokes on other layers are ignored.
    #[arg(long, global = true, value_enum, default_value_t = LayerArg::Start)]
    layer: LayerArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print `{ groups, strokes }` for the input.
    Group {
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        idle_time: Option<f64>,
        /// Label groups by their smallest member id.
        #[arg(long)]
        stable_ids: bool,
    },
    /// Print the feature vector of every stroke that has points.
    Features,
    /// Print the score breakdown for one stroke pair.
    Score {
        a: String,
        b: String,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        idle_time: Option<f64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LayerArg {
    Background,
    Start,
    End,
    Final,
}

impl From<LayerArg> for Layer {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Background => Layer::Background,
            LayerArg::Start => Layer::Start,
            LayerArg::End => Layer::End,
            LayerArg::Final => Layer::Final,
        }
    }
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let raw = read_input(&cli.input)?;
    let strokes = layer_strokes(serde_json::from_str(&raw)?, cli.layer.into());
    debug!(input = %cli.input, strokes = strokes.len(), "strokes loaded");

    let defaults = ServiceConfig::from_env().settings;
    let output = match cli.command {
        Command::Group { threshold, idle_time, stable_ids } => {
            let settings = resolve_settings(defaults, threshold, idle_time)?;
            group_output(&strokes, &settings, stable_ids)
        }
        Command::Features => serde_json::to_value(feature_list(&strokes))?,
        Command::Score { a, b, threshold, idle_time } => {
            let settings = resolve_settings(defaults, threshold, idle_time)?;
            serde_json::to_value(score_report(&strokes, &settings, &a, &b)?)?
        }
    };
    print_json(&output)
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Strokes on `layer`, in input order. A repeated id keeps its first
/// occurrence, the same rule the engine applies.
fn layer_strokes(strokes: Vec<Stroke>, layer: Layer) -> Vec<Stroke> {
    let mut seen: HashSet<String> = HashSet::with_capacity(strokes.len());
    strokes
        .into_iter()
        .filter(|s| {
            let first = seen.insert(s.id.clone());
            if !first {
                warn!(stroke_id = %s.id, "duplicate stroke id skipped");
            }
            first
        })
        .filter(|s| s.layer == layer)
        .collect()
}

fn resolve_settings(
    defaults: GroupingSettings,
    threshold: Option<f64>,
    idle_time: Option<f64>,
) -> Result<GroupingSettings, CliError> {
    Ok(GroupingSettings::new(
        threshold.unwrap_or(defaults.grouping_threshold()),
        idle_time.unwrap_or(defaults.idle_time()),
    )?)
}

fn group_output(strokes: &[Stroke], settings: &GroupingSettings, stable_ids: bool) -> Value {
    let mut result = recompute(strokes, settings);
    if stable_ids {
        result = result.with_stable_ids();
    }
    let groups: BTreeMap<_, _> = result.groups().iter().collect();
    let members: BTreeMap<_, _> = result.stroke_to_group().iter().collect();
    json!({ "groups": groups, "strokes": members })
}

fn feature_list(strokes: &[Stroke]) -> Vec<StrokeFeatures> {
    strokes.iter().filter_map(extract_features).collect()
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    a: String,
    b: String,
    delta_ms: f64,
    temporal: f64,
    spatial: f64,
    geometry: f64,
    behavior: f64,
    weighted: f64,
    combined: f64,
    /// How the pair fares inside the clustering pass over the whole layer.
    session: SessionReport,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    flow: f64,
    idle_time: f64,
    behavior_threshold: f64,
    combined: f64,
    adaptive_threshold: f64,
    burst: bool,
    merged: bool,
}

fn score_report(strokes: &[Stroke], settings: &GroupingSettings, a: &str, b: &str) -> Result<ScoreReport, CliError> {
    let features = feature_list(strokes);
    let fa = find_features(strokes, &features, a)?;
    let fb = find_features(strokes, &features, b)?;

    let delta_ms = temporal_delta_ms(fa, fb);
    let raw = score_pair(fa, fb, settings.idle_time());

    let session = SessionThresholds::new(settings, &features);
    let in_session = score_pair(fa, fb, session.idle_time);
    let adaptive_threshold = session.adaptive_threshold(&in_session);
    let burst = session.is_burst(delta_ms, &in_session);

    Ok(ScoreReport {
        a: a.to_owned(),
        b: b.to_owned(),
        delta_ms,
        temporal: raw.temporal,
        spatial: raw.spatial,
        geometry: raw.geometry,
        behavior: raw.behavior,
        weighted: raw.weighted_sum(),
        combined: raw.combined,
        session: SessionReport {
            flow: session.flow,
            idle_time: session.idle_time,
            behavior_threshold: session.behavior_threshold,
            combined: in_session.combined,
            adaptive_threshold,
            burst,
            merged: in_session.combined >= adaptive_threshold || burst,
        },
    })
}

fn find_features<'a>(
    strokes: &[Stroke],
    features: &'a [StrokeFeatures],
    id: &str,
) -> Result<&'a StrokeFeatures, CliError> {
    if let Some(found) = features.iter().find(|f| f.id == id) {
        return Ok(found);
    }
    if strokes.iter().any(|s| s.id == id) {
        return Err(CliError::EmptyStroke(id.to_owned()));
    }
    Err(CliError::UnknownStroke(id.to_owned()))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
