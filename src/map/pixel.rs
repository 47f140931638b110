use std::collections::BTreeSet;

use crate::foundation::color::Color;
use crate::foundation::error::{PixelcastError, PixelcastResult};

pub use kurbo::Point;

/// Wire order of the color channels within a pixel's DMX slots.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorOrder {
    #[default]
    Rgb,
    Rbg,
    Brg,
    Bgr,
    Grb,
    Gbr,
}

impl ColorOrder {
    /// Permute logical `(R, G, B)` into wire order. W always passes through
    /// unchanged as a trailing byte.
    pub fn permute(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            Self::Rgb => [r, g, b],
            Self::Rbg => [r, b, g],
            Self::Brg => [b, r, g],
            Self::Bgr => [b, g, r],
            Self::Grb => [g, r, b],
            Self::Gbr => [g, b, r],
        }
    }
}

/// Electrical pixel variant: how many DMX channels one pixel occupies.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    #[default]
    Rgb,
    Rgbw,
}

impl PixelType {
    pub fn channels(self) -> u16 {
        match self {
            Self::Rgb => 3,
            Self::Rgbw => 4,
        }
    }
}

/// One addressable pixel: immutable spatial/electrical identity plus the
/// mutable current color.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Pixel {
    pub x: i16,
    pub y: i16,
    pub universe: u16,
    /// 1-based index of the pixel within its universe.
    pub channel_position: u16,
    #[serde(default)]
    pub color_order: ColorOrder,
    #[serde(default)]
    pub pixel_type: PixelType,
    /// Named logical groupings for selective addressing by patterns.
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(skip)]
    color: Color,
}

impl Pixel {
    pub fn new(x: i16, y: i16, universe: u16, channel_position: u16) -> Self {
        Self {
            x,
            y,
            universe,
            channel_position,
            color_order: ColorOrder::default(),
            pixel_type: PixelType::default(),
            sections: Vec::new(),
            color: Color::BLACK,
        }
    }

    pub fn with_color_order(mut self, order: ColorOrder) -> Self {
        self.color_order = order;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    pub fn with_sections(mut self, sections: &[&str]) -> Self {
        self.sections = sections.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Spatial sampling coordinate for color masks.
    pub fn point(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    pub fn in_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }
}

/// Ordered pixel buffer shared between the active pattern, the DMX packer and
/// the visualizer publisher.
#[derive(Clone, Debug)]
pub struct PixelMap {
    pixels: Vec<Pixel>,
}

impl PixelMap {
    /// Build a map, rejecting duplicate `(universe, channel_position)` pairs.
    pub fn new(pixels: Vec<Pixel>) -> PixelcastResult<Self> {
        let mut seen = BTreeSet::new();
        for pixel in &pixels {
            if !seen.insert((pixel.universe, pixel.channel_position)) {
                return Err(PixelcastError::validation(format!(
                    "duplicate pixel at universe {} position {}",
                    pixel.universe, pixel.channel_position
                )));
            }
        }
        Ok(Self { pixels })
    }

    /// Deserialize a layout from JSON: `[{x, y, universe, channel_position, …}, …]`.
    pub fn from_json(data: &str) -> PixelcastResult<Self> {
        let pixels: Vec<Pixel> = serde_json::from_str(data)
            .map_err(|e| PixelcastError::validation(format!("invalid layout json: {e}")))?;
        Self::new(pixels)
    }

    /// Built-in demo layout: a planar grid spanning two universes, useful for
    /// the visualizer and for exercising multi-universe packing.
    pub fn demo_grid() -> Self {
        const COLUMNS: i16 = 20;
        const ROWS: i16 = 10;
        const SPACING: i16 = 40;
        const ORIGIN: i16 = 100;
        // 170 RGB pixels fill 510 of a universe's 512 channels.
        const PER_UNIVERSE: u16 = 170;

        let mut pixels = Vec::new();
        let mut count: u16 = 0;
        for col in 0..COLUMNS {
            for row in 0..ROWS {
                let universe = 1 + count / PER_UNIVERSE;
                let channel_position = 1 + count % PER_UNIVERSE;
                pixels.push(Pixel::new(
                    ORIGIN + col * SPACING,
                    ORIGIN + row * SPACING,
                    universe,
                    channel_position,
                ));
                count += 1;
            }
        }
        Self { pixels }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pixel> {
        self.pixels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pixel> {
        self.pixels.iter_mut()
    }

    /// The distinct universes referenced by the map, ascending.
    pub fn universes(&self) -> Vec<u16> {
        let set: BTreeSet<u16> = self.pixels.iter().map(|p| p.universe).collect();
        set.into_iter().collect()
    }

    /// Copy out the current colors, in pixel order.
    pub fn snapshot_colors(&self) -> Vec<Color> {
        self.pixels.iter().map(Pixel::color).collect()
    }

    /// Restore colors captured by [`Self::snapshot_colors`].
    pub fn restore_colors(&mut self, colors: &[Color]) {
        for (pixel, color) in self.pixels.iter_mut().zip(colors) {
            pixel.set_color(*color);
        }
    }

    /// Bounding-box center of the layout, the reference point for radial
    /// patterns.
    pub fn center(&self) -> Point {
        if self.pixels.is_empty() {
            return Point::ORIGIN;
        }
        let (mut min_x, mut max_x) = (i16::MAX, i16::MIN);
        let (mut min_y, mut max_y) = (i16::MAX, i16::MIN);
        for p in &self.pixels {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Point::new(
            f64::from(min_x) + f64::from(max_x - min_x) / 2.0,
            f64::from(min_y) + f64::from(max_y - min_y) / 2.0,
        )
    }

    /// Serialize the post-render state for the visualizer feed:
    /// `{"pixels":[{x,y,r,g,b},…]}`.
    pub fn visualizer_json(&self) -> String {
        #[derive(serde::Serialize)]
        struct FramePixel {
            x: i16,
            y: i16,
            r: u8,
            g: u8,
            b: u8,
        }
        #[derive(serde::Serialize)]
        struct Frame {
            pixels: Vec<FramePixel>,
        }

        let frame = Frame {
            pixels: self
                .pixels
                .iter()
                .map(|p| FramePixel {
                    x: p.x,
                    y: p.y,
                    r: p.color.r,
                    g: p.color.g,
                    b: p.color.b,
                })
                .collect(),
        };
        // Serialization of a plain value cannot fail.
        serde_json::to_string(&frame).unwrap_or_else(|_| String::from("{\"pixels\":[]}"))
    }
}
