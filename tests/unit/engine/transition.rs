use super::*;
use crate::engine::pattern::{PatternCore, shared_mask};
use crate::map::pixel::Pixel;

/// Minimal stateful pattern painting a fixed color, counting updates.
struct Paint {
    core: PatternCore,
    color: Color,
    updates: usize,
}

impl Paint {
    fn new(color: Color) -> Self {
        Self {
            core: PatternCore::new("Paint", Parameters::new()),
            color,
            updates: 0,
        }
    }
}

impl Pattern for Paint {
    fn name(&self) -> &'static str {
        "paint"
    }
    fn label(&self) -> &str {
        self.core.label()
    }
    fn update(&mut self, pixels: &mut PixelMap) {
        self.updates += 1;
        for pixel in pixels.iter_mut() {
            pixel.set_color(self.color);
        }
    }
    fn parameters(&self) -> &Parameters {
        self.core.parameters()
    }
    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        self.core.parameters_mut().update_from(request)
    }
    fn set_color_mask(&mut self, mask: Option<SharedColorMask>) {
        self.core.set_mask(mask);
    }
    fn color_mask(&self) -> Option<SharedColorMask> {
        self.core.mask()
    }
    fn transition_from(
        &mut self,
        source: &mut dyn Pattern,
        progress: f64,
        pixels: &mut PixelMap,
    ) {
        crossfade(self, source, progress, pixels);
    }
    fn update_request(&self) -> UpdateRequest {
        self.core.parameters().zero_request()
    }
}

struct Fixed {
    color: Color,
    parameters: Parameters,
}

impl Fixed {
    fn new(color: Color) -> Self {
        Self {
            color,
            parameters: Parameters::new(),
        }
    }
}

impl ColorMask for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }
    fn label(&self) -> &str {
        "Fixed"
    }
    fn update(&mut self) {}
    fn color_at(&self, _point: Point) -> Color {
        self.color
    }
    fn parameters(&self) -> &Parameters {
        &self.parameters
    }
    fn update_parameters(&mut self, _request: &UpdateRequest) -> PixelcastResult<()> {
        Ok(())
    }
}

fn small_map() -> PixelMap {
    PixelMap::new(vec![Pixel::new(0, 0, 1, 1), Pixel::new(10, 0, 1, 2)]).unwrap()
}

#[test]
fn progress_clamps_and_zero_duration_is_instant() {
    let now = Instant::now();
    let fade = Transition {
        source_pattern: "a".into(),
        target_pattern: "b".into(),
        source_mask: None,
        target_mask: None,
        target_mask_name: None,
        started: now,
        duration: Duration::from_millis(1000),
    };
    assert_eq!(fade.progress(now), 0.0);
    assert!((fade.progress(now + Duration::from_millis(500)) - 0.5).abs() < 0.001);
    assert_eq!(fade.progress(now + Duration::from_millis(5000)), 1.0);

    let instant = Transition {
        duration: Duration::ZERO,
        ..fade
    };
    assert_eq!(instant.progress(now), 1.0);
}

#[test]
fn endpoints_run_one_pattern_only() {
    let mut pixels = small_map();
    let mut source = Paint::new(Color::rgb(0, 0, 0));
    let mut target = Paint::new(Color::rgb(100, 0, 0));

    crossfade(&mut target, &mut source, 0.0, &mut pixels);
    assert_eq!(pixels.pixels()[0].color(), Color::rgb(0, 0, 0));
    assert_eq!(source.updates, 1);
    assert_eq!(target.updates, 0);

    crossfade(&mut target, &mut source, 1.0, &mut pixels);
    assert_eq!(pixels.pixels()[0].color(), Color::rgb(100, 0, 0));
    assert_eq!(target.updates, 1);
}

#[test]
fn midpoint_blends_both_frames() {
    let mut pixels = small_map();
    let mut source = Paint::new(Color::rgb(0, 0, 0));
    let mut target = Paint::new(Color::rgb(100, 0, 0));

    crossfade(&mut target, &mut source, 0.5, &mut pixels);
    for pixel in pixels.iter() {
        let c = pixel.color();
        assert!((49..=51).contains(&c.r), "r = {}", c.r);
        assert_eq!((c.g, c.b), (0, 0));
    }
}

#[test]
fn mask_fade_detection() {
    let mask_a = shared_mask(Fixed::new(Color::rgb(255, 0, 0)));
    let mask_b = shared_mask(Fixed::new(Color::rgb(0, 0, 255)));
    let fade = Transition {
        source_pattern: "p".into(),
        target_pattern: "p".into(),
        source_mask: Some(mask_a),
        target_mask: Some(mask_b),
        target_mask_name: Some("b".into()),
        started: Instant::now(),
        duration: Duration::from_millis(100),
    };
    assert!(fade.is_mask_fade());
}

#[test]
fn blended_mask_endpoints_are_exact() {
    let red = shared_mask(Fixed::new(Color::rgb(255, 0, 0)));
    let blue = shared_mask(Fixed::new(Color::rgb(0, 0, 255)));
    let origin = Point::new(0.0, 0.0);

    let start = BlendedColorMask::new(red.clone(), blue.clone(), 0.0);
    assert_eq!(start.color_at(origin), Color::rgb(255, 0, 0));

    let end = BlendedColorMask::new(red, blue, 1.0);
    assert_eq!(end.color_at(origin), Color::rgb(0, 0, 255));
}

#[test]
fn blended_mask_midpoint_stays_saturated() {
    let red = shared_mask(Fixed::new(Color::rgb(255, 0, 0)));
    let blue = shared_mask(Fixed::new(Color::rgb(0, 0, 255)));
    let mid = BlendedColorMask::new(red, blue, 0.5);
    let c = mid.color_at(Point::new(0.0, 0.0));
    let (_, s, v) = c.to_hsv();
    assert!(s > 0.9, "saturation {s} washed out");
    assert!(v > 0.9, "value {v} washed out");
}
