//! Color-mask catalog: spatial colorizers that host patterns sample per
//! pixel. Masks are registered once at startup and addressed by name.

mod gradient_mask;
mod rainbow_circle_mask;
mod rainbow_diagonal_mask;
mod solid_mask;
mod wave_mask;

use std::collections::BTreeMap;

use crate::engine::pattern::{SharedColorMask, shared_mask};
use crate::map::pixel::Point;

pub use gradient_mask::GradientMask;
pub use rainbow_circle_mask::RainbowCircleMask;
pub use rainbow_diagonal_mask::RainbowDiagonalMask;
pub use solid_mask::SolidMask;
pub use wave_mask::WaveMask;

/// Mask installed by default when a controller is built.
pub const DEFAULT_COLOR_MASK: &str = "rainbowCircleMask";

/// Masks sample layout space; these describe the nominal playing field the
/// default layouts occupy.
pub(crate) const FIELD_SIZE: f64 = 800.0;
pub(crate) const FIELD_CENTER: Point = Point::new(400.0, 400.0);

/// All available color masks, keyed by their stable names.
pub fn register_color_masks() -> BTreeMap<String, SharedColorMask> {
    let mut masks: BTreeMap<String, SharedColorMask> = BTreeMap::new();
    masks.insert(
        "solidMask".to_string(),
        shared_mask(SolidMask::new()),
    );
    masks.insert(
        "rainbowCircleMask".to_string(),
        shared_mask(RainbowCircleMask::new()),
    );
    masks.insert(
        "rainbowDiagonalMask".to_string(),
        shared_mask(RainbowDiagonalMask::new()),
    );
    masks.insert(
        "gradientMask".to_string(),
        shared_mask(GradientMask::new()),
    );
    masks.insert("waveMask".to_string(), shared_mask(WaveMask::new()));
    masks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::PoisonError;

    #[test]
    fn registry_contains_default_mask() {
        let masks = register_color_masks();
        assert!(masks.contains_key(DEFAULT_COLOR_MASK));
    }

    #[test]
    fn names_match_registry_keys() {
        for (key, mask) in register_color_masks() {
            let mask = mask.lock().unwrap_or_else(PoisonError::into_inner);
            assert_eq!(mask.name(), key);
        }
    }
}
