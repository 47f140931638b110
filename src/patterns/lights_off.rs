use crate::engine::pattern::{Pattern, PatternCore, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

pub struct LightsOff {
    core: PatternCore,
}

impl LightsOff {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new("Lights Off", Parameters::new()),
        }
    }
}

impl Default for LightsOff {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for LightsOff {
    fn name(&self) -> &'static str {
        "lightsOff"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        for pixel in pixels.iter_mut() {
            pixel.set_color(Color::BLACK);
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
