use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::pattern::{Pattern, PatternCore, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Random pixels flash each frame. Lit pixels sample the installed color
/// mask when one is present.
pub struct Sparkle {
    core: PatternCore,
    rng: StdRng,
}

impl Sparkle {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Sparkle",
                Parameters::new()
                    .color("color", Color::rgb(255, 255, 255))
                    .float("density", 0.05, 0.01, 0.5),
            ),
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for Sparkle {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Sparkle {
    fn name(&self) -> &'static str {
        "sparkle"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let color = self.core.parameters().color_value("color");
        let density = self.core.parameters().float_value("density");

        let choices: Vec<bool> = (0..pixels.len())
            .map(|_| self.rng.gen_bool(density.clamp(0.0, 1.0)))
            .collect();

        let colors: Vec<Color> = pixels
            .iter()
            .zip(&choices)
            .map(|(pixel, &lit)| {
                if lit {
                    self.core.mask_color(pixel.point()).unwrap_or(color)
                } else {
                    Color::BLACK
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
