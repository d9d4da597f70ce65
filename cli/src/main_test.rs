#![allow(clippy::float_cmp)]

use super::*;

const DUMP: &str = r#"[
    {"id": "a", "size": 2, "points": [{"x": 0, "y": 0, "t": 0}, {"x": 20, "y": 20, "t": 80}]},
    {"id": "b", "size": 2, "startedAt": 120, "points": [{"x": 22, "y": 20, "t": 0}, {"x": 40, "y": 0, "t": 60}]},
    {"id": "far", "size": 2, "startedAt": 90000, "points": [{"x": 4000, "y": 4000, "t": 0}, {"x": 4030, "y": 4010, "t": 70}]},
    {"id": "empty", "size": 2, "points": []},
    {"id": "bg", "size": 2, "layer": "background", "points": [{"x": 0, "y": 0, "t": 0}]}
]"#;

fn strokes() -> Vec<Stroke> {
    layer_strokes(serde_json::from_str(DUMP).unwrap(), Layer::Start)
}

#[test]
fn layer_filter_drops_other_layers() {
    let ids: Vec<_> = strokes().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, ["a", "b", "far", "empty"]);
    let bg = layer_strokes(serde_json::from_str(DUMP).unwrap(), Layer::Background);
    assert_eq!(bg.len(), 1);
}

#[test]
fn repeated_id_keeps_first_occurrence() {
    let raw = r#"[
        {"id": "a", "size": 2, "points": [{"x": 0, "y": 0, "t": 0}]},
        {"id": "a", "size": 9, "points": [{"x": 500, "y": 500, "t": 0}]},
        {"id": "b", "size": 2, "layer": 1, "points": [{"x": 5, "y": 5, "t": 0}]}
    ]"#;
    let strokes = layer_strokes(serde_json::from_str(raw).unwrap(), Layer::Start);
    let ids: Vec<_> = strokes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(strokes[0].size, 2.0);
}

#[test]
fn group_output_lists_groups_and_strokes() {
    let out = group_output(&strokes(), &GroupingSettings::default(), true);
    assert_eq!(out["strokes"]["a"], "a");
    assert_eq!(out["strokes"]["b"], "a");
    assert_eq!(out["strokes"]["far"], "far");
    assert_eq!(out["groups"]["a"], json!(["a", "b"]));
    assert_eq!(out["groups"]["empty"], json!(["empty"]));
    assert_eq!(out["groups"].as_object().map(serde_json::Map::len), Some(3));
}

#[test]
fn features_skip_pointless_strokes() {
    let features = feature_list(&strokes());
    let ids: Vec<_> = features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "far"]);
}

#[test]
fn score_report_for_touching_pair() {
    let report = score_report(&strokes(), &GroupingSettings::default(), "a", "b").unwrap();
    assert_eq!(report.delta_ms, 40.0);
    assert!(report.combined >= 0.95);
    assert!(report.session.merged);
}

#[test]
fn score_report_errors() {
    let settings = GroupingSettings::default();
    assert!(matches!(
        score_report(&strokes(), &settings, "a", "ghost"),
        Err(CliError::UnknownStroke(id)) if id == "ghost"
    ));
    assert!(matches!(
        score_report(&strokes(), &settings, "empty", "a"),
        Err(CliError::EmptyStroke(id)) if id == "empty"
    ));
}

#[test]
fn flags_override_defaults() {
    let settings = resolve_settings(GroupingSettings::default(), Some(0.2), None).unwrap();
    assert_eq!(settings.grouping_threshold(), 0.2);
    assert_eq!(settings.idle_time(), 1.5);
    assert!(matches!(
        resolve_settings(GroupingSettings::default(), Some(1.5), None),
        Err(CliError::Settings(SettingsError::ThresholdOutOfRange(_)))
    ));
}

#[test]
fn cli_parses_score_command() {
    let cli = Cli::try_parse_from(["inkgroup", "score", "a", "b", "--idle-time", "2", "--layer", "end", "-i", "dump.json"])
        .unwrap();
    assert_eq!(cli.input, "dump.json");
    assert_eq!(cli.layer, LayerArg::End);
    assert!(matches!(cli.command, Command::Score { ref a, idle_time: Some(t), .. } if a == "a" && t == 2.0));
}
