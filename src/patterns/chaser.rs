use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Dots running along the strip order with a short decaying tail.
pub struct Chaser {
    core: PatternCore,
    offset: Phase,
}

const TAIL: f64 = 3.0;

impl Chaser {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Chaser",
                Parameters::new()
                    .color("color", Color::rgb(255, 0, 0))
                    .float("speed", 5.0, 0.1, 20.0)
                    .int("spacing", 10, 2, 30),
            ),
            offset: Phase::new(27_720.0),
        }
    }
}

impl Default for Chaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Chaser {
    fn name(&self) -> &'static str {
        "chaser"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let color = params.color_value("color");
        let speed = params.float_value("speed");
        let spacing = params.int_value("spacing").max(2) as f64;
        let offset = self.offset.advance(speed);

        for (i, pixel) in pixels.iter_mut().enumerate() {
            let position = (i as f64 + offset).rem_euclid(spacing);
            let level = if position < TAIL {
                1.0 - position / TAIL
            } else {
                0.0
            };
            pixel.set_color(color.scaled(level));
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
