use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Colored bars of `size` layout units scrolling along the x axis.
pub struct VerticalStripes {
    core: PatternCore,
    offset: Phase,
}

impl VerticalStripes {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Vertical Stripes",
                Parameters::new()
                    .color("color", Color::rgb(255, 0, 255))
                    .float("speed", 10.0, 0.0, 20.0)
                    .float("size", 20.0, 5.0, 100.0),
            ),
            offset: Phase::new(10_000.0),
        }
    }
}

impl Default for VerticalStripes {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for VerticalStripes {
    fn name(&self) -> &'static str {
        "verticalStripes"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let color = params.color_value("color");
        let speed = params.float_value("speed");
        let size = params.float_value("size").max(1.0);
        let offset = self.offset.advance(speed);

        for pixel in pixels.iter_mut() {
            let band = ((f64::from(pixel.x) + offset) / size).rem_euclid(2.0);
            pixel.set_color(if band < 1.0 { color } else { Color::BLACK });
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
