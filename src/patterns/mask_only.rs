use crate::engine::pattern::{Pattern, PatternCore, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Pure colorizer passthrough: every pixel shows the installed mask's field.
/// Black with no mask installed.
pub struct MaskOnly {
    core: PatternCore,
}

impl MaskOnly {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new("Mask Only", Parameters::new()),
        }
    }
}

impl Default for MaskOnly {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for MaskOnly {
    fn name(&self) -> &'static str {
        "maskOnly"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let colors: Vec<Color> = pixels
            .iter()
            .map(|pixel| {
                self.core
                    .mask_color(pixel.point())
                    .unwrap_or(Color::BLACK)
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
