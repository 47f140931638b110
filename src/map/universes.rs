use std::collections::{HashMap, HashSet};

use crate::map::pixel::{PixelMap, PixelType};

/// Channels in one DMX universe.
pub const UNIVERSE_CHANNELS: usize = 512;

/// Denormalized universe -> ordered pixel lookup.
///
/// We think about the world in terms of DMX-over-ethernet universes, so the
/// pixel map gets denormalized once at startup into per-universe index lists,
/// ordered by channel position. That makes the per-frame packing a straight
/// sequential write instead of a lookup per pixel.
#[derive(Debug)]
pub struct UniverseIndex {
    by_universe: HashMap<u16, Vec<usize>>,
    warned_slots: HashSet<(u16, u16)>,
}

impl UniverseIndex {
    pub fn new(map: &PixelMap) -> Self {
        let mut by_universe: HashMap<u16, Vec<usize>> = HashMap::new();
        for (i, pixel) in map.iter().enumerate() {
            by_universe.entry(pixel.universe).or_default().push(i);
        }
        for indices in by_universe.values_mut() {
            indices.sort_by_key(|&i| map.pixels()[i].channel_position);
        }
        Self {
            by_universe,
            warned_slots: HashSet::new(),
        }
    }

    pub fn universes(&self) -> Vec<u16> {
        let mut list: Vec<u16> = self.by_universe.keys().copied().collect();
        list.sort_unstable();
        list
    }

    /// Pack one universe's DMX buffer from the current pixel colors.
    ///
    /// Slots not covered by any pixel stay zero. A pixel whose slot range runs
    /// past channel 512 is skipped and warned about once per slot.
    pub fn pack(&mut self, universe: u16, map: &PixelMap) -> [u8; UNIVERSE_CHANNELS] {
        let mut buffer = [0u8; UNIVERSE_CHANNELS];
        let Some(indices) = self.by_universe.get(&universe) else {
            return buffer;
        };

        for &i in indices {
            let pixel = &map.pixels()[i];
            let channels = usize::from(pixel.pixel_type.channels());
            let pos = usize::from(pixel.channel_position.saturating_sub(1)) * channels;
            if pixel.channel_position == 0 || pos + channels > UNIVERSE_CHANNELS {
                if self.warned_slots.insert((universe, pixel.channel_position)) {
                    tracing::warn!(
                        universe,
                        position = pixel.channel_position,
                        "pixel slot range exceeds universe, skipping"
                    );
                }
                continue;
            }

            let color = pixel.color();
            let wire = pixel.color_order.permute([color.r, color.g, color.b]);
            buffer[pos..pos + 3].copy_from_slice(&wire);
            if pixel.pixel_type == PixelType::Rgbw {
                buffer[pos + 3] = color.w;
            }
        }

        buffer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/map/universes.rs"]
mod tests;
