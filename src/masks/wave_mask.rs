use std::f64::consts::TAU;

use crate::engine::pattern::{ColorMask, MaskCore, Phase};
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::Point;
use crate::masks::FIELD_SIZE;
use crate::params::parameter::{Parameters, UpdateRequest};

/// Planar interference wave between two colors. Direction is the wavefront
/// normal in degrees.
pub struct WaveMask {
    core: MaskCore,
    phase: Phase,
}

impl WaveMask {
    pub fn new() -> Self {
        Self {
            core: MaskCore::new(
                "Wave",
                Parameters::new()
                    .color("color1", Color::rgb(0, 64, 255))
                    .color("color2", Color::rgb(255, 255, 255))
                    .float("waveSpeed", 2.0, 0.1, 20.0)
                    .float("waveFrequency", 3.0, 0.1, 20.0)
                    .float("waveDirection", 0.0, 0.0, 360.0),
            ),
            phase: Phase::new(TAU),
        }
    }
}

impl Default for WaveMask {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMask for WaveMask {
    fn name(&self) -> &'static str {
        "waveMask"
    }

    fn label(&self) -> &str {
        self.core.label()
    }

    fn update(&mut self) {
        let speed = self.core.parameters().float_value("waveSpeed");
        self.phase.advance(speed * 0.05);
    }

    fn color_at(&self, point: Point) -> Color {
        let params = self.core.parameters();
        let frequency = params.float_value("waveFrequency");
        let direction = params.float_value("waveDirection").to_radians();

        let nx = point.x / FIELD_SIZE;
        let ny = point.y / FIELD_SIZE;
        let projection = nx * direction.cos() + ny * direction.sin();
        let wave = (projection * frequency * TAU + self.phase.value()).sin();

        Color::blend(
            params.color_value("color1"),
            params.color_value("color2"),
            (wave + 1.0) / 2.0,
        )
    }

    fn parameters(&self) -> &Parameters {
        self.core.parameters()
    }

    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()> {
        self.core.parameters_mut().update_from(request)
    }
}
