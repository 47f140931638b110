use std::f64::consts::TAU;

use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::{PixelMap, Point};
use crate::params::parameter::{Parameters, UpdateRequest};

/// Rotating Archimedean spiral. Pixels inside the arm take `color1` (or the
/// installed color mask), the rest take `color2`.
pub struct Spiral {
    core: PatternCore,
    rotation: Phase,
}

impl Spiral {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Spiral",
                Parameters::new()
                    .color("color1", Color::rgb(255, 0, 0))
                    .color("color2", Color::rgb(0, 0, 255))
                    .float("speed", 8.0, 1.0, 20.0)
                    .int("maxTurns", 4, 1, 12)
                    .float("width", 30.0, 10.0, 40.0),
            ),
            rotation: Phase::new(360.0),
        }
    }
}

impl Default for Spiral {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance from a point to the nearest winding of a spiral
/// `r(θ) = growth · θ` rotated by `rotation` radians around `center`.
fn distance_to_arm(point: Point, center: Point, growth: f64, rotation: f64) -> f64 {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let r = (dx * dx + dy * dy).sqrt();
    let theta = (dy.atan2(dx) - rotation).rem_euclid(TAU);

    if growth <= 0.0 {
        return r;
    }

    // The windings through angle theta sit at radii growth·(theta + 2πk).
    let k = ((r / growth - theta) / TAU).round();
    let arm_radius = growth * (theta + TAU * k.max(0.0));
    (r - arm_radius).abs()
}

impl Pattern for Spiral {
    fn name(&self) -> &'static str {
        "spiral"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let color1 = params.color_value("color1");
        let color2 = params.color_value("color2");
        let speed = params.float_value("speed");
        let max_turns = params.int_value("maxTurns").max(1) as f64;
        let width = params.float_value("width");

        let rotation = self.rotation.advance(speed).to_radians();
        let center = pixels.center();

        // Growth rate that fills the layout's radius in max_turns windings.
        let max_radius = pixels
            .iter()
            .map(|p| p.point().distance(center))
            .fold(0.0_f64, f64::max)
            .max(1.0);
        let growth = max_radius / (max_turns * TAU);

        let colors: Vec<Color> = pixels
            .iter()
            .map(|pixel| {
                let point = pixel.point();
                if distance_to_arm(point, center, growth, rotation) <= width / 2.0 {
                    self.core.mask_color(point).unwrap_or(color1)
                } else {
                    color2
                }
            })
            .collect();

        for (pixel, color) in pixels.iter_mut().zip(colors) {
            pixel.set_color(color);
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
