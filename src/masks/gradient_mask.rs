use crate::engine::pattern::{ColorMask, MaskCore, Phase};
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::Point;
use crate::masks::FIELD_SIZE;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Two-color gradient drifting horizontally across the field.
pub struct GradientMask {
    core: MaskCore,
    phase: Phase,
}

impl GradientMask {
    pub fn new() -> Self {
        Self {
            core: MaskCore::new(
                "Gradient",
                Parameters::new()
                    .color("color1", Color::rgb(255, 0, 0))
                    .color("color2", Color::rgb(0, 0, 255))
                    .float("speed", 1.0, 0.0, 20.0)
                    .boolean("reversed", false),
            ),
            phase: Phase::new(1.0),
        }
    }
}

impl Default for GradientMask {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangle wave over one period so the gradient cycles without a seam.
fn triangle(t: f64) -> f64 {
    1.0 - (2.0 * t - 1.0).abs()
}

impl ColorMask for GradientMask {
    fn name(&self) -> &'static str {
        "gradientMask"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self) {
        let params = self.core.parameters();
        let speed = params.float_value("speed") * 0.005;
        let rate = if params.bool_value("reversed") {
            -speed
        } else {
            speed
        };
        self.phase.advance(rate);
    }

    fn color_at(&self, point: Point) -> Color {
        let params = self.core.parameters();
        let nx = point.x / FIELD_SIZE;
        let t = (nx + self.phase.value()).rem_euclid(1.0);
        Color::blend(
            params.color_value("color1"),
            params.color_value("color2"),
            triangle(t),
        )
    }

    fn parameters(&self) -> &Parameters {
        self.core.parameters()
    }

    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        self.core.parameters_mut().update_from(request)
    }
}
