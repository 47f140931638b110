use std::f64::consts::TAU;

use crate::engine::pattern::{Pattern, PatternCore, Phase, SharedColorMask};
use crate::engine::transition::crossfade;
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::PixelMap;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Rotating wedges around the layout center. Lit wedges sample the installed
/// color mask when one is present; `rainbow` maps the wedge angle onto the
/// hue wheel instead of the fixed hue.
pub struct Pinwheel {
    core: PatternCore,
    rotation: Phase,
}

impl Pinwheel {
    pub fn new() -> Self {
        Self {
            core: PatternCore::new(
                "Pinwheel",
                Parameters::new()
                    .float("speed", 0.02, 0.001, 0.1)
                    .int("divisions", 4, 1, 15)
                    .float("hue", 120.0, 0.0, 360.0)
                    .boolean("rainbow", false)
                    .boolean("reversed", true),
            ),
            rotation: Phase::new(TAU),
        }
    }
}

impl Default for Pinwheel {
    fn default() -> Self {
        Self::new()
    }
}

impl Pattern for Pinwheel {
    fn name(&self) -> &'static str {
        "pinwheel"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self, pixels: &mut PixelMap) {
        let params = self.core.parameters();
        let speed = params.float_value("speed");
        let divisions = params.int_value("divisions").max(1) as f64;
        let hue = params.float_value("hue");
        let rainbow = params.bool_value("rainbow");
        let rate = if params.bool_value("reversed") {
            -speed
        } else {
            speed
        };

        let rotation = self.rotation.advance(rate);
        let wedge = TAU / (divisions * 2.0);
        let center = pixels.center();

        let colors: Vec<Color> = pixels
            .iter()
            .map(|pixel| {
                let point = pixel.point();
                let angle = ((point.y - center.y).atan2(point.x - center.x) + rotation)
                    .rem_euclid(TAU);
                let lit = (angle / wedge) as i64 % 2 == 0;

                if !lit {
                    Color::BLACK
                } else if let Some(masked) = self.core.mask_color(point) {
                    masked
                } else if rainbow {
                    Color::from_hsv(angle.to_degrees(), 1.0, 1.0)
                } else {
                    Color::from_hsv(hue, 1.0, 1.0)
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
