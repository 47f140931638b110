use crate::engine::pattern::{ColorMask, MaskCore};
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::Point;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Uniform colorizer: every point gets the configured color.
pub struct SolidMask {
    core: MaskCore,
}

impl SolidMask {
    pub fn new() -> Self {
        Self {
            core: MaskCore::new(
                "Solid",
                Parameters::new().color("color", Color::rgb(255, 0, 0)),
            ),
        }
    }
}

impl Default for SolidMask {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMask for SolidMask {
    fn name(&self) -> &'static str {
        "solidMask"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self) {}

    fn color_at(&self, _point: Point) -> Color {
        self.core.parameters().color_value("color")
    }

    fn parameters(&self) -> &Parameters {
        self.core.parameters()
    }

    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        self.core.parameters_mut().update_from(request)
    }
}
