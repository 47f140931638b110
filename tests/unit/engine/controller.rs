use super::*;
use crate::engine::options;
use crate::foundation::color::Color;
use crate::map::pixel::Pixel;
use serde_json::json;

fn request(body: serde_json::Value) -> UpdateRequest {
    serde_json::from_value(body).unwrap()
}

fn solid(r: u8, g: u8, b: u8) -> UpdateRequest {
    request(json!({"parameters": {"color": {"value": {"r": r, "g": g, "b": b}}}}))
}

fn controller_with(
    opts: Options,
    initial: &str,
) -> (PixelController, mpsc::Receiver<Vec<u8>>) {
    let (tx, rx) = mpsc::channel(4);
    let mut sinks = HashMap::new();
    sinks.insert(1u16, tx);
    let tracker = Arc::new(ErrorTracker::new(Duration::from_secs(1), 10));
    let pixels = PixelMap::new(vec![Pixel::new(0, 0, 1, 1)]).unwrap();
    let controller =
        PixelController::new(sinks, tracker, 20, initial, pixels, options::shared(opts))
            .unwrap();
    (controller, rx)
}

fn first_pixel(controller: &PixelController) -> Color {
    controller.pixels.pixels()[0].color()
}

#[test]
fn unknown_initial_pattern_is_rejected() {
    let (tx, _rx) = mpsc::channel(1);
    let mut sinks = HashMap::new();
    sinks.insert(1u16, tx);
    let tracker = Arc::new(ErrorTracker::new(Duration::from_secs(1), 10));
    let pixels = PixelMap::new(vec![Pixel::new(0, 0, 1, 1)]).unwrap();
    let result = PixelController::new(
        sinks,
        tracker,
        20,
        "nope",
        pixels,
        options::shared(Options::default()),
    );
    assert!(matches!(result, Err(PixelcastError::UnknownName(_))));
}

#[test]
fn instant_switch_when_transitions_disabled() {
    let opts = Options {
        pattern_transition_enabled: false,
        ..Options::default()
    };
    let (mut controller, _rx) = controller_with(opts, "lightsOff");
    controller.current_mask = None;

    controller
        .update_pattern("solidColor", &solid(255, 0, 0))
        .unwrap();
    controller.tick(Instant::now());

    assert_eq!(controller.current_pattern, "solidColor");
    assert!(controller.transition.is_none());
    assert_eq!(first_pixel(&controller), Color::rgb(255, 0, 0));
}

#[test]
fn zero_duration_transition_is_instant() {
    let mut opts = Options::default();
    opts.pattern_transition_duration = Duration::ZERO;
    let (mut controller, _rx) = controller_with(opts, "lightsOff");

    controller
        .update_pattern("solidColor", &solid(10, 20, 30))
        .unwrap();
    controller.tick(Instant::now());

    assert_eq!(controller.current_pattern, "solidColor");
    assert!(controller.transition.is_none());
}

#[test]
fn mid_transition_blend() {
    let mut opts = Options::default();
    opts.pattern_transition_duration = Duration::from_millis(1000);
    let (mut controller, _rx) = controller_with(opts, "lightsOff");
    controller.current_mask = None;

    controller
        .update_pattern("solidColor", &solid(100, 0, 0))
        .unwrap();

    let t0 = Instant::now();
    controller.tick(t0);
    assert!(controller.transition.is_some());
    assert_eq!(first_pixel(&controller), Color::BLACK);

    controller.tick(t0 + Duration::from_millis(500));
    let mid = first_pixel(&controller);
    assert!((49..=51).contains(&mid.r), "mid-fade r = {}", mid.r);
    assert_eq!((mid.g, mid.b), (0, 0));

    controller.tick(t0 + Duration::from_millis(1000));
    assert_eq!(first_pixel(&controller), Color::rgb(100, 0, 0));
    assert_eq!(controller.current_pattern, "solidColor");
    assert!(controller.transition.is_none());
}

#[test]
fn same_name_update_applies_in_place_without_transition() {
    let (mut controller, _rx) = controller_with(Options::default(), "solidColor");
    controller.current_mask = None;

    controller
        .update_pattern("solidColor", &solid(0, 255, 0))
        .unwrap();
    controller.tick(Instant::now());

    assert!(controller.transition.is_none());
    assert_eq!(first_pixel(&controller), Color::rgb(0, 255, 0));
}

#[test]
fn unknown_pattern_update_is_rejected() {
    let (mut controller, _rx) = controller_with(Options::default(), "solidColor");
    let err = controller
        .update_pattern("doesNotExist", &UpdateRequest::default())
        .unwrap_err();
    assert!(matches!(err, PixelcastError::UnknownName(_)));
}

#[test]
fn pending_change_reports_channel_full() {
    let (controller, _rx) = controller_with(Options::default(), "solidColor");
    controller.request_pattern_change("rainbow").unwrap();
    let err = controller.request_pattern_change("plasma").unwrap_err();
    assert!(matches!(err, PixelcastError::ChannelFull(_)));
}

#[test]
fn pattern_change_supersedes_mask_fade() {
    let (mut controller, _rx) = controller_with(Options::default(), "maskOnly");

    controller.update_color_mask(Some("solidMask"), None).unwrap();
    let t0 = Instant::now();
    controller.tick(t0);
    assert!(
        controller
            .transition
            .as_ref()
            .is_some_and(Transition::is_mask_fade)
    );

    controller.request_pattern_change("solidColor").unwrap();
    controller.tick(t0 + Duration::from_millis(10));
    let fade = controller.transition.as_ref().unwrap();
    assert!(!fade.is_mask_fade());
    assert_eq!(fade.target_pattern, "solidColor");
}

#[test]
fn mask_fade_completes_and_installs_target() {
    let mut opts = Options::default();
    opts.color_mask_transition_duration = Duration::from_millis(100);
    let (mut controller, _rx) = controller_with(opts, "maskOnly");

    controller.update_color_mask(Some("solidMask"), None).unwrap();
    let t0 = Instant::now();
    controller.tick(t0);
    assert!(controller.transition.is_some());

    controller.tick(t0 + Duration::from_millis(150));
    assert!(controller.transition.is_none());
    assert_eq!(controller.current_mask.as_deref(), Some("solidMask"));
}

#[test]
fn mask_change_without_current_mask_is_immediate() {
    let (mut controller, _rx) = controller_with(Options::default(), "maskOnly");
    controller.current_mask = None;
    controller.install_mask_on_current();

    controller.update_color_mask(Some("solidMask"), None).unwrap();
    controller.tick(Instant::now());

    assert!(controller.transition.is_none());
    assert_eq!(controller.current_mask.as_deref(), Some("solidMask"));
}

#[test]
fn publish_packs_current_colors() {
    let (mut controller, mut rx) = controller_with(Options::default(), "solidColor");
    controller.current_mask = None;
    controller
        .update_pattern("solidColor", &solid(10, 20, 30))
        .unwrap();

    controller.tick(Instant::now());

    let frame = rx.try_recv().unwrap();
    assert_eq!(frame.len(), 512);
    assert_eq!(&frame[0..3], &[10, 20, 30]);
    assert!(frame[3..].iter().all(|&b| b == 0));
}

#[test]
fn brightness_scales_published_frame() {
    let mut opts = Options::default();
    opts.brightness = 50.0;
    let (mut controller, mut rx) = controller_with(opts, "solidColor");
    controller.current_mask = None;
    controller
        .update_pattern("solidColor", &solid(100, 0, 0))
        .unwrap();

    controller.tick(Instant::now());

    let frame = rx.try_recv().unwrap();
    assert_eq!(frame[0], 50);
}

#[test]
fn identical_ticks_produce_identical_frames() {
    let (mut controller, mut rx) = controller_with(Options::default(), "solidColor");
    controller.current_mask = None;

    let now = Instant::now();
    controller.tick(now);
    controller.tick(now + Duration::from_millis(50));

    let first = rx.try_recv().unwrap();
    let second = rx.try_recv().unwrap();
    assert_eq!(first, second);
}

#[test]
fn full_sink_drops_frames_without_blocking() {
    let (tx, mut rx) = mpsc::channel(1);
    let mut sinks = HashMap::new();
    sinks.insert(1u16, tx);
    let tracker = Arc::new(ErrorTracker::new(Duration::from_secs(60), 2));
    let pixels = PixelMap::new(vec![Pixel::new(0, 0, 1, 1)]).unwrap();
    let mut controller = PixelController::new(
        sinks,
        tracker.clone(),
        20,
        "solidColor",
        pixels,
        options::shared(Options::default()),
    )
    .unwrap();

    let now = Instant::now();
    for i in 0..4 {
        controller.tick(now + Duration::from_millis(50 * i));
    }

    // Exactly one frame buffered; the rest were dropped and counted.
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
    assert!(tracker.in_backoff());
}

#[test]
fn update_callback_sees_post_composite_colors() {
    let mut opts = Options::default();
    opts.brightness = 50.0;
    let (mut controller, _rx) = controller_with(opts, "solidColor");
    controller.current_mask = None;
    controller
        .update_pattern("solidColor", &solid(100, 0, 0))
        .unwrap();

    let seen = Arc::new(StdMutex::new(Color::BLACK));
    let sink = seen.clone();
    controller.set_update_callback(move |pixels| {
        *sink.lock().unwrap() = pixels.pixels()[0].color();
    });

    controller.tick(Instant::now());
    assert_eq!(*seen.lock().unwrap(), Color::rgb(50, 0, 0));
}
