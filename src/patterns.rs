//! Pattern catalog. Every pattern is a plug-in against the
//! [`crate::engine::pattern::Pattern`] contract, registered once at startup
//! and addressed by its stable name.

mod chaser;
mod gradient;
mod lights_off;
mod mask_only;
mod pinwheel;
mod plasma;
mod pulse;
mod rainbow;
mod rainbow_circle;
mod rainbow_diagonal;
mod solid_color;
mod sparkle;
mod spiral;
mod vertical_stripes;

use std::collections::BTreeMap;

use crate::engine::pattern::Pattern;

pub use chaser::Chaser;
pub use gradient::Gradient;
pub use lights_off::LightsOff;
pub use mask_only::MaskOnly;
pub use pinwheel::Pinwheel;
pub use plasma::Plasma;
pub use pulse::Pulse;
pub use rainbow::Rainbow;
pub use rainbow_circle::RainbowCircle;
pub use rainbow_diagonal::RainbowDiagonal;
pub use solid_color::SolidColor;
pub use sparkle::Sparkle;
pub use spiral::Spiral;
pub use vertical_stripes::VerticalStripes;

/// All available patterns with their default parameter sets, keyed by their
/// stable names.
pub fn register_patterns() -> BTreeMap<String, Box<dyn Pattern>> {
    let list: Vec<Box<dyn Pattern>> = vec![
        Box::new(SolidColor::new()),
        Box::new(LightsOff::new()),
        Box::new(Rainbow::new()),
        Box::new(RainbowDiagonal::new()),
        Box::new(RainbowCircle::new()),
        Box::new(Pinwheel::new()),
        Box::new(Gradient::new()),
        Box::new(Pulse::new()),
        Box::new(Spiral::new()),
        Box::new(VerticalStripes::new()),
        Box::new(Chaser::new()),
        Box::new(Sparkle::new()),
        Box::new(Plasma::new()),
        Box::new(MaskOnly::new()),
    ];
    list.into_iter()
        .map(|pattern| (pattern.name().to_string(), pattern))
        .collect()
}
