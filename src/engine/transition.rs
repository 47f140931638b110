use std::sync::PoisonError;
use std::time::{Duration, Instant};

use crate::engine::pattern::{ColorMask, Pattern, SharedColorMask};
use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::{PixelMap, Point};
use crate::params::parameter::{Parameters, UpdateRequest};

/// Cross-fade state carried by the controller while a fade is in progress.
///
/// A mask-only fade keeps `source_pattern == target_pattern` and carries two
/// distinct masks; a pattern fade carries the outgoing and incoming pattern
/// names.
pub struct Transition {
    pub source_pattern: String,
    pub target_pattern: String,
    pub source_mask: Option<SharedColorMask>,
    pub target_mask: Option<SharedColorMask>,
    /// Registry name the current mask should take once the fade completes.
    pub target_mask_name: Option<String>,
    pub started: Instant,
    pub duration: Duration,
}

impl Transition {
    /// Fade progress in `[0, 1]`. A zero duration is instant.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// True when this fade blends two masks over an unchanged pattern.
    pub fn is_mask_fade(&self) -> bool {
        self.source_pattern == self.target_pattern
            && self.source_mask.is_some()
            && self.target_mask.is_some()
    }
}

/// Default cross-fade between two frame producers.
///
/// Patterns are stateful renderers that mutate the shared buffer, so we
/// snapshot around each invocation: run the target, capture its frame, restore
/// the buffer, run the source, then blend the two captures back in. This fades
/// any two pattern implementations without asking them to expose internal
/// state.
pub fn crossfade(
    target: &mut dyn Pattern,
    source: &mut dyn Pattern,
    progress: f64,
    pixels: &mut PixelMap,
) {
    if progress >= 1.0 {
        target.update(pixels);
        return;
    }
    if progress <= 0.0 {
        source.update(pixels);
        return;
    }

    let original = pixels.snapshot_colors();

    target.update(pixels);
    let target_colors = pixels.snapshot_colors();

    pixels.restore_colors(&original);
    source.update(pixels);
    let source_colors = pixels.snapshot_colors();

    for ((pixel, s), t) in pixels
        .iter_mut()
        .zip(source_colors.iter())
        .zip(target_colors.iter())
    {
        pixel.set_color(Color::blend(*s, *t, progress));
    }
}

/// Synthetic mask installed on the active pattern for the duration of one
/// mask-fade tick. Samples both masks and blends between them.
pub struct BlendedColorMask {
    source: SharedColorMask,
    target: SharedColorMask,
    progress: f64,
    parameters: Parameters,
}

impl BlendedColorMask {
    pub fn new(source: SharedColorMask, target: SharedColorMask, progress: f64) -> Self {
        Self {
            source,
            target,
            progress,
            parameters: Parameters::new(),
        }
    }
}

/// Quadratic ease-in-out over `[0, 1]`.
fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn near_black(c: Color) -> bool {
    c.r < 3 && c.g < 3 && c.b < 3
}

/// Blend two mask samples. Hue travels the shortest path around the wheel and
/// saturation/value blend quadratically so mid-fade colors don't wash out;
/// near-black endpoints fall back to a straight RGB blend.
fn blend_mask_colors(source: Color, target: Color, eased: f64) -> Color {
    if eased < 0.01 {
        return source;
    }
    if eased > 0.99 {
        return target;
    }
    if near_black(source) || near_black(target) {
        return Color::blend(source, target, eased);
    }

    let (mut sh, ss, sv) = source.to_hsv();
    let (mut th, ts, tv) = target.to_hsv();

    // Low-saturation endpoints take the other side's hue.
    if ss < 0.1 && ts > 0.1 {
        sh = th;
    } else if ts < 0.1 && ss > 0.1 {
        th = sh;
    }

    if th - sh > 180.0 {
        sh += 360.0;
    } else if sh - th > 180.0 {
        th += 360.0;
    }

    let h = (sh * (1.0 - eased) + th * eased).rem_euclid(360.0);
    let s = (ss * ss * (1.0 - eased) + ts * ts * eased).sqrt();
    let v = (sv * sv * (1.0 - eased) + tv * tv * eased).sqrt();
    Color::from_hsv(h, s, v)
}

impl ColorMask for BlendedColorMask {
    fn name(&self) -> &'static str {
        "blendedColorMask"
    }

    fn label(&self) -> &str {
        "Blended"
    }

    fn update(&mut self) {
        // Source and target are updated by the controller's fade step.
    }

    fn color_at(&self, point: Point) -> Color {
        let source = self
            .source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .color_at(point);
        let target = self
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .color_at(point);
        blend_mask_colors(source, target, ease_in_out(self.progress))
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn update_parameters(&mut self, _request: &UpdateRequest) -> PixelcastResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/transition.rs"]
mod tests;
