use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

fn request(body: serde_json::Value) -> UpdateRequest {
    serde_json::from_value(body).unwrap()
}

#[test]
fn float_update_respects_bounds() {
    let mut params = Parameters::new().float("speed", 5.0, 0.1, 20.0);

    params
        .update_from(&request(json!({"parameters": {"speed": {"value": 7.5}}})))
        .unwrap();
    assert_eq!(params.float_value("speed"), 7.5);

    let err = params
        .update_from(&request(json!({"parameters": {"speed": {"value": 99.0}}})))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterRange(_)));
    // Failed update leaves the value unchanged.
    assert_eq!(params.float_value("speed"), 7.5);
}

#[test]
fn type_mismatch_is_rejected() {
    let mut params = Parameters::new().float("speed", 5.0, 0.1, 20.0);
    let err = params
        .update_from(&request(json!({"parameters": {"speed": {"value": "fast"}}})))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterType(_)));
}

#[test]
fn unknown_name_is_a_shape_mismatch() {
    let mut params = Parameters::new().boolean("reversed", false);
    let err = params
        .update_from(&request(json!({"parameters": {"sped": {"value": 1.0}}})))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterType(_)));
}

#[test]
fn int_rejects_fractional_values() {
    let mut params = Parameters::new().int("divisions", 4, 1, 15);
    let err = params
        .update_from(&request(json!({"parameters": {"divisions": {"value": 2.5}}})))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterType(_)));

    params
        .update_from(&request(json!({"parameters": {"divisions": {"value": 9}}})))
        .unwrap();
    assert_eq!(params.int_value("divisions"), 9);
}

#[test]
fn color_channels_validated() {
    let mut params = Parameters::new().color("color", Color::BLACK);

    params
        .update_from(&request(
            json!({"parameters": {"color": {"value": {"r": 255, "g": 0, "b": 10}}}}),
        ))
        .unwrap();
    assert_eq!(params.color_value("color"), Color::rgb(255, 0, 10));

    let err = params
        .update_from(&request(
            json!({"parameters": {"color": {"value": {"r": 300, "g": 0, "b": 0}}}}),
        ))
        .unwrap_err();
    assert!(matches!(err, PixelcastError::ParameterRange(_)));
}

#[test]
fn partial_updates_keep_other_values() {
    let mut params = Parameters::new()
        .float("speed", 5.0, 0.1, 20.0)
        .boolean("reversed", true);
    params
        .update_from(&request(json!({"parameters": {"speed": {"value": 1.0}}})))
        .unwrap();
    assert!(params.bool_value("reversed"));
}

#[test]
fn randomize_respects_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut params = Parameters::new()
        .float("speed", 5.0, 0.5, 2.0)
        .int("count", 1, 3, 9)
        .color("color", Color::BLACK)
        .boolean("flip", false);

    for _ in 0..50 {
        params.randomize_all(&mut rng);
        let speed = params.float_value("speed");
        assert!((0.5..=2.0).contains(&speed), "speed {speed} out of bounds");
        let count = params.int_value("count");
        assert!((3..=9).contains(&count), "count {count} out of bounds");
        // Full saturation/value hues always have one zero and one 255 channel.
        let color = params.color_value("color");
        let max = color.r.max(color.g).max(color.b);
        assert_eq!(max, 255);
        assert_eq!(color.w, 0);
    }
}

#[test]
fn zero_request_matches_shape() {
    let params = Parameters::new()
        .float("speed", 5.0, 0.1, 20.0)
        .color("color", Color::rgb(1, 2, 3));
    let zero = params.zero_request();
    assert_eq!(zero.parameters["speed"], json!({"value": 0.0}));
    assert_eq!(
        zero.parameters["color"],
        json!({"value": {"r": 0, "g": 0, "b": 0, "w": 0}})
    );
}

#[test]
fn serializes_catalog_shape() {
    let params = Parameters::new().float("speed", 5.0, 0.1, 20.0);
    let value = serde_json::to_value(&params).unwrap();
    assert_eq!(
        value,
        json!({"speed": {"type": "float", "value": 5.0, "min": 0.1, "max": 20.0}})
    );
}
