use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::foundation::color::Color;
use crate::foundation::error::PixelcastResult;
use crate::map::pixel::{PixelMap, Point};
use crate::params::parameter::{Parameters, UpdateRequest};

/// A polymorphic frame producer. One pattern is active per controller; the
/// render loop calls [`Pattern::update`] once per tick.
pub trait Pattern: Send {
    /// Stable string identifier, the key in the pattern catalog.
    fn name(&self) -> &'static str;

    /// Human-readable label for the HTTP surface.
    fn label(&self) -> &str;

    /// Write this frame's colors into the shared pixel buffer. May hold
    /// internal time, phase or RNG state; must produce the same frame for the
    /// same internal state.
    fn update(&mut self, pixels: &mut PixelMap);

    fn parameters(&self) -> &Parameters;

    /// Bounded, partial parameter update from an inbound request.
    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()>;

    /// Install (or clear) the colorizer this pattern samples per pixel.
    fn set_color_mask(&mut self, mask: Option<SharedColorMask>);

    fn color_mask(&self) -> Option<SharedColorMask>;

    /// Produce one cross-fade frame from `source` toward this pattern.
    /// Implementations delegate to [`crate::engine::transition::crossfade`].
    fn transition_from(
        &mut self,
        source: &mut dyn Pattern,
        progress: f64,
        pixels: &mut PixelMap,
    );

    /// A zero-valued request whose shape matches this pattern's parameters.
    fn update_request(&self) -> UpdateRequest;
}

/// A pattern-shaped spatial colorizer. Host patterns sample
/// [`ColorMask::color_at`] per pixel instead of choosing colors themselves.
///
/// The mask advances its internal phase once per tick via its own `update()`;
/// host patterns must not call it.
pub trait ColorMask: Send {
    fn name(&self) -> &'static str;

    fn label(&self) -> &str;

    /// Advance the mask's internal phase for this tick.
    fn update(&mut self);

    /// The color of the mask field at a spatial point.
    fn color_at(&self, point: Point) -> Color;

    fn parameters(&self) -> &Parameters;

    fn update_parameters(&mut self, request: &UpdateRequest) -> PixelcastResult<()>;
}

/// Shared handle to a color mask. Masks are shared between the controller and
/// the active pattern, and a synthetic blended mask borrows two of them for
/// the duration of a tick.
pub type SharedColorMask = Arc<Mutex<dyn ColorMask>>;

pub fn shared_mask(mask: impl ColorMask + 'static) -> SharedColorMask {
    Arc::new(Mutex::new(mask))
}

/// Common state embedded by every pattern implementation: label, parameter
/// set, and the optional installed color mask.
pub struct PatternCore {
    label: &'static str,
    parameters: Parameters,
    mask: Option<SharedColorMask>,
}

impl PatternCore {
    pub fn new(label: &'static str, parameters: Parameters) -> Self {
        Self {
            label,
            parameters,
            mask: None,
        }
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn set_mask(&mut self, mask: Option<SharedColorMask>) {
        self.mask = mask;
    }

    pub fn mask(&self) -> Option<SharedColorMask> {
        self.mask.clone()
    }

    /// Sample the installed mask at a point, if one is installed.
    pub fn mask_color(&self, point: Point) -> Option<Color> {
        self.mask.as_ref().map(|mask| {
            mask.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .color_at(point)
        })
    }
}

/// Common state embedded by every color mask implementation.
pub struct MaskCore {
    label: &'static str,
    parameters: Parameters,
}

impl MaskCore {
    pub fn new(label: &'static str, parameters: Parameters) -> Self {
        Self { label, parameters }
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }
}

/// Wall-clock-driven animation phase.
///
/// Speed parameters are calibrated in steps per nominal 50 ms frame, so a
/// pattern animates at the same apparent rate regardless of the configured
/// tick rate.
pub struct Phase {
    value: f64,
    modulus: f64,
    last: Option<Instant>,
}

/// Nominal steps per second for speed parameters.
const STEP_RATE_HZ: f64 = 20.0;

impl Phase {
    pub fn new(modulus: f64) -> Self {
        Self {
            value: 0.0,
            modulus,
            last: None,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance by `rate` steps scaled by the elapsed wall-clock time and
    /// return the new value. The first call establishes the time base.
    pub fn advance(&mut self, rate: f64) -> f64 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last = Some(now);
        self.value = (self.value + rate * dt * STEP_RATE_HZ).rem_euclid(self.modulus);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::parameter::Parameters;

    struct Still;

    impl ColorMask for Still {
        fn name(&self) -> &'static str {
            "still"
        }
        fn label(&self) -> &str {
            "Still"
        }
        fn update(&mut self) {}
        fn color_at(&self, _point: Point) -> Color {
            Color::rgb(1, 2, 3)
        }
        fn parameters(&self) -> &Parameters {
            static EMPTY: std::sync::OnceLock<Parameters> = std::sync::OnceLock::new();
            EMPTY.get_or_init(Parameters::new)
        }
        fn update_parameters(&mut self, _request: &UpdateRequest) -> PixelcastResult<()> {
            Ok(())
        }
    }

    #[test]
    fn core_samples_installed_mask() {
        let mut core = PatternCore::new("Test", Parameters::new());
        assert!(core.mask_color(Point::new(0.0, 0.0)).is_none());

        core.set_mask(Some(shared_mask(Still)));
        assert_eq!(
            core.mask_color(Point::new(0.0, 0.0)),
            Some(Color::rgb(1, 2, 3))
        );
    }

    #[test]
    fn phase_wraps_at_modulus() {
        let mut phase = Phase::new(360.0);
        phase.value = 359.5;
        phase.last = Some(Instant::now() - std::time::Duration::from_millis(100));
        let v = phase.advance(1.0);
        assert!((0.0..360.0).contains(&v));
    }
}
