use crate::engine::pattern::{ColorMask, MaskCore, Phase};
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::Point;
use crate::params::parameter::{Parameters, UpdateRequest};

const MAX_HUE: f64 = 360.0;

/// Rainbow bands sweeping diagonally across the field.
pub struct RainbowDiagonalMask {
    core: MaskCore,
    phase: Phase,
}

impl RainbowDiagonalMask {
    pub fn new() -> Self {
        Self {
            core: MaskCore::new(
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

impl Default for RainbowDiagonalMask {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMask for RainbowDiagonalMask {
    fn name(&self) -> &'static str {
        "rainbowDiagonalMask"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self) {
        let params = self.core.parameters();
        let speed = params.float_value("speed");
        let rate = if params.bool_value("reversed") {
            -speed
        } else {
            speed
        };
        self.phase.advance(rate);
    }

    fn color_at(&self, point: Point) -> Color {
        let size = self.core.parameters().float_value("size");
        let hue = (self.phase.value() + (point.x + point.y) * size).rem_euclid(MAX_HUE);
        Color::from_hsv(hue, 1.0, 1.0)
    }

    fn parameters(&self) -> &Parameters {
        self.core.parameters()
    }

    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        self.core.parameters_mut().update_from(request)
    }
}
