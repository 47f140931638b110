use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

const MAX_HUE: f64 = 360.0;

/// Rainbow bands sweeping diagonally across the layout.
pub struct RainbowDiagonal {
    core: PatternCore,
    phase: Phase,
}

impl RainbowDiagonal {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Rainbow Diagonal",
                Parameters::new()
                    .float("speed", 6.0, 0.1, 20.0)
                    .float("size", 0.5, 0.1, 1.0)
                    .boolean("reversed", true),
            ),
            phase: Phase::new(MAX_HUE),
        }
    }
}

impl Default for RainbowDiagonal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for RainbowDiagonal {
    fn name(&self) -> &'static str {
        "rainbowDiagonal"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let speed = params.float_value("speed");
        let size = params.float_value("size");
        let rate = if params.bool_value("reversed") {
            -speed
        } else {
            speed
        };
        let base = self.phase.advance(rate);

        for pixel in pixels.iter_mut() {
            let hue = (base + (f64::from(pixel.x) + f64::from(pixel.y)) * size)
                .rem_euclid(MAX_HUE);
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
