use std::f64::consts::TAU;

use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Sinusoidal breathing of a single color.
pub struct Pulse {
    core: PatternCore,
    phase: Phase,
}

impl Pulse {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Pulse",
                Parameters::new()
                    .color("color", crate::foundation::color::Color::rgb(255, 0, 0))
                    .float("speed", 1.0, 0.1, 20.0),
            ),
            phase: Phase::new(TAU),
        }
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Pulse {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let color = self.core.parameters().color_value("color");
        let speed = self.core.parameters().float_value("speed");
        let level = (self.phase.advance(speed * 0.1).sin() + 1.0) / 2.0;
        let dimmed = color.scaled(level);
        for pixel in pixels.iter_mut() {
            pixel.set_color(dimmed);
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
