#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

// =============================================================================
// GroupingSettings::new
// =============================================================================

#[test]
fn default_matches_constants() {
    let s = GroupingSettings::default();
    assert_eq!(s.grouping_threshold(), DEFAULT_GROUPING_THRESHOLD);
    assert_eq!(s.idle_time(), DEFAULT_IDLE_TIME_SECS);
    assert_eq!(s.idle_time_ms(), 1500.0);
}

#[test]
fn new_accepts_bounds() {
    assert!(GroupingSettings::new(0.0, 0.1).is_ok());
    assert!(GroupingSettings::new(1.0, 30.0).is_ok());
}

#[test]
fn new_rejects_threshold_out_of_range() {
    assert_eq!(GroupingSettings::new(1.2, 1.5), Err(SettingsError::ThresholdOutOfRange(1.2)));
    assert_eq!(GroupingSettings::new(-0.1, 1.5), Err(SettingsError::ThresholdOutOfRange(-0.1)));
    assert!(matches!(GroupingSettings::new(f64::NAN, 1.5), Err(SettingsError::ThresholdOutOfRange(_))));
}

#[test]
fn new_rejects_non_positive_idle_time() {
    assert_eq!(GroupingSettings::new(0.5, 0.0), Err(SettingsError::IdleTimeNotPositive(0.0)));
    assert_eq!(GroupingSettings::new(0.5, -2.0), Err(SettingsError::IdleTimeNotPositive(-2.0)));
    assert!(GroupingSettings::new(0.5, f64::INFINITY).is_err());
}

#[test]
fn error_messages_name_the_field() {
    let err = GroupingSettings::new(2.0, 1.0).unwrap_err();
    assert!(err.to_string().contains("threshold"));
    let err = GroupingSettings::new(0.5, 0.0).unwrap_err();
    assert!(err.to_string().contains("idle time"));
}

// =============================================================================
// GroupingSettings::clamped
// =============================================================================

#[test]
fn clamped_passes_valid_values_through() {
    let s = GroupingSettings::clamped(0.7, 2.0);
    assert_eq!(s, GroupingSettings::new(0.7, 2.0).unwrap());
}

#[test]
fn clamped_limits_threshold() {
    assert_eq!(GroupingSettings::clamped(1.5, 1.0).grouping_threshold(), 1.0);
    assert_eq!(GroupingSettings::clamped(-3.0, 1.0).grouping_threshold(), 0.0);
}

#[test]
fn clamped_floors_idle_time() {
    assert_eq!(GroupingSettings::clamped(0.5, 0.0).idle_time(), MIN_IDLE_TIME_SECS);
    assert_eq!(GroupingSettings::clamped(0.5, -1.0).idle_time(), MIN_IDLE_TIME_SECS);
}

#[test]
fn clamped_nan_falls_back_to_defaults() {
    let s = GroupingSettings::clamped(f64::NAN, f64::NAN);
    assert_eq!(s, GroupingSettings::default());
}

// =============================================================================
// serde
// =============================================================================

#[test]
fn deserialize_valid_settings() {
    let s: GroupingSettings = serde_json::from_value(json!({ "groupingThreshold": 0.3, "idleTime": 2.0 })).unwrap();
    assert_eq!(s.grouping_threshold(), 0.3);
    assert_eq!(s.idle_time(), 2.0);
}

#[test]
fn deserialize_rejects_invalid_settings() {
    let res: Result<GroupingSettings, _> = serde_json::from_value(json!({ "groupingThreshold": 3.0, "idleTime": 2.0 }));
    assert!(res.is_err());
}

#[test]
fn serialize_uses_camel_case() {
    let v = serde_json::to_value(GroupingSettings::default()).unwrap();
    assert_eq!(v, json!({ "groupingThreshold": 0.5, "idleTime": 1.5 }));
}

// =============================================================================
// env_parse / ServiceConfig
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u64 = env_parse("__INKGROUP_TEST_NONEXISTENT__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__INKGROUP_TEST_VALID__", " 99 ") };
    let val: u64 = env_parse("__INKGROUP_TEST_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__INKGROUP_TEST_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__INKGROUP_TEST_INVALID__", "soon") };
    let val: f64 = env_parse("__INKGROUP_TEST_INVALID__", 7.5);
    assert_eq!(val, 7.5);
    unsafe { std::env::remove_var("__INKGROUP_TEST_INVALID__") };
}

#[test]
fn service_config_default_uses_constants() {
    let cfg = ServiceConfig::default();
    assert_eq!(cfg.debounce, Duration::from_millis(DEFAULT_DEBOUNCE_MS));
    assert_eq!(cfg.settings, GroupingSettings::default());
}
