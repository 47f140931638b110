use std::f64::consts::TAU;

use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Classic sine-field plasma mapped onto the hue wheel.
pub struct Plasma {
    core: PatternCore,
    time: Phase,
}

impl Plasma {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Plasma",
                Parameters::new()
                    .float("speed", 1.0, 0.1, 10.0)
                    .float("scale", 1.0, 0.1, 5.0),
            ),
            time: Phase::new(TAU * 10_000.0),
        }
    }
}

impl Default for Plasma {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Plasma {
    fn name(&self) -> &'static str {
        "plasma"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let speed = self.core.parameters().float_value("speed");
        let scale = self.core.parameters().float_value("scale");
        let t = self.time.advance(speed * 0.1);

        for pixel in pixels.iter_mut() {
            let nx = f64::from(pixel.x) / 100.0 * scale;
            let ny = f64::from(pixel.y) / 100.0 * scale;
            let field = (nx + t).sin()
                + (ny + t * 0.5).sin()
                + ((nx + ny) * 0.5 + t * 0.3).sin()
                + ((nx * nx + ny * ny).sqrt() + t).sin();
            let hue = (field + 4.0) / 8.0 * 360.0;
            pixel.set_color(Color::from_hsv(hue, 1.0, 1.0));
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
