use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Two-color gradient drifting along the x axis.
pub struct Gradient {
    core: PatternCore,
    offset: Phase,
}

impl Gradient {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Gradient",
                Parameters::new()
                    .color("color1", Color::rgb(255, 0, 0))
                    .color("color2", Color::rgb(0, 0, 255))
                    .float("speed", 1.0, 0.0, 20.0)
                    .boolean("reversed", false),
            ),
            offset: Phase::new(1.0),
        }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::new()
    }
}

fn triangle(t: f64) -> f64 {
    1.0 - (2.0 * t - 1.0).abs()
}

impl Pattern for Gradient {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let color1 = params.color_value("color1");
        let color2 = params.color_value("color2");
        let speed = params.float_value("speed") * 0.005;
        let rate = if params.bool_value("reversed") {
            -speed
        } else {
            speed
        };
        let offset = self.offset.advance(rate);

        let (min_x, max_x) = pixels.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
            (lo.min(f64::from(p.x)), hi.max(f64::from(p.x)))
        });
        let span = (max_x - min_x).max(1.0);

        for pixel in pixels.iter_mut() {
            let nx = (f64::from(pixel.x) - min_x) / span;
            let t = (nx + offset).rem_euclid(1.0);
            pixel.set_color(Color::blend(color1, color2, triangle(t)));
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
