use super::*;
use serde_json::json;

#[test]
fn defaults_match_registered_values() {
    let options = Options::default();
    assert_eq!(
        options.pattern_transition_duration,
        Duration::from_millis(2000)
    );
    assert_eq!(
        options.color_mask_transition_duration,
        Duration::from_millis(1000)
    );
    assert!(options.pattern_transition_enabled);
    assert!(options.color_mask_transition_enabled);
    assert_eq!(options.brightness, 100.0);
    assert_eq!(options.gamma, 1.0);
}

#[test]
fn set_duration_in_millis() {
    let mut options = Options::default();
    options
        .set("patternTransitionDuration", &json!(500))
        .unwrap();
    assert_eq!(
        options.pattern_transition_duration,
        Duration::from_millis(500)
    );
}

#[test]
fn rejects_out_of_range() {
    let mut options = Options::default();
    let err = options.set("brightness", &json!(150.0)).unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterRange(_)));
    assert_eq!(options.brightness, 100.0);

    let err = options.set("gamma", &json!(0.05)).unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterRange(_)));
}

#[test]
fn rejects_type_mismatch() {
    let mut options = Options::default();
    let err = options
        .set("patternTransitionEnabled", &json!("yes"))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterType(_)));
}

#[test]
fn unknown_option_id() {
    let mut options = Options::default();
    let err = options.set("contrast", &json!(1.0)).unwrap_err();
    assert!(matches!(err, PixelcastError::UnknownName(_)));
}

#[test]
fn reset_restores_defaults() {
    let mut options = Options::default();
    options.set("brightness", &json!(10.0)).unwrap();
    options.set("patternTransitionEnabled", &json!(false)).unwrap();
    options.reset();
    assert_eq!(options, Options::default());
}

#[test]
fn serializes_registered_shape() {
    let options = Options::default();
    let value = serde_json::to_value(&options).unwrap();
    assert_eq!(value["brightness"]["type"], "float");
    assert_eq!(value["brightness"]["value"], 100.0);
    assert_eq!(value["brightness"]["max"], 100.0);
    assert_eq!(value["patternTransitionDuration"]["value"], 2000);
    assert_eq!(value["patternTransitionEnabled"]["type"], "boolean");
}
