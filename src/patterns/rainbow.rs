use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

const MAX_HUE: f64 = 360.0;

/// The whole map cycles through the hue wheel in unison.
pub struct Rainbow {
    core: PatternCore,
    phase: Phase,
}

impl Rainbow {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Rainbow",
                Parameters::new()
                    .float("speed", 1.0, 0.1, 10.0)
                    .float("brightness", 100.0, 1.0, 100.0),
            ),
            phase: Phase::new(MAX_HUE),
        }
    }
}

impl Default for Rainbow {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Rainbow {
    fn name(&self) -> &'static str {
        "rainbow"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let speed = self.core.parameters().float_value("speed");
        let brightness = self.core.parameters().float_value("brightness") / 100.0;
        let hue = self.phase.advance(speed);
        let color = Color::from_hsv(hue, 1.0, brightness);
        for pixel in pixels.iter_mut() {
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
