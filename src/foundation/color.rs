/// 8-bit-per-channel RGBW color, the unit of every pixel buffer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default)]
    pub w: u8,
}

/// Round a float channel value into the 0..=255 pigment range.
fn pigment(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        w: 0,
    };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    /// Componentwise linear blend: `a·(1-t) + b·t`.
    ///
    /// Endpoints are exact — no blending arithmetic at `t <= 0` or `t >= 1`.
    pub fn blend(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        let mix = |x: u8, y: u8| pigment(f64::from(x) * (1.0 - t) + f64::from(y) * t);
        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            w: mix(a.w, b.w),
        }
    }

    /// Scale every channel by `factor` (brightness, `factor` in `[0, 1]`).
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            r: pigment(f64::from(self.r) * factor),
            g: pigment(f64::from(self.g) * factor),
            b: pigment(f64::from(self.b) * factor),
            w: pigment(f64::from(self.w) * factor),
        }
    }

    /// Apply a gamma curve: `out = (in/255)^γ · 255`.
    pub fn gamma(self, gamma: f64) -> Self {
        let curve = |c: u8| pigment((f64::from(c) / 255.0).powf(gamma) * 255.0);
        Self {
            r: curve(self.r),
            g: curve(self.g),
            b: curve(self.b),
            w: curve(self.w),
        }
    }

    /// Convert HSV to RGB. Hue in degrees (wraps), saturation and value in `[0, 1]`.
    /// W is always 0.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        if s == 0.0 {
            let grey = pigment(v * 255.0);
            return Self {
                r: grey,
                g: grey,
                b: grey,
                w: 0,
            };
        }

        let sector = h / 60.0;
        let i = sector.floor();
        let f = sector - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match (i as i32) % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Self {
            r: pigment(r * 255.0),
            g: pigment(g * 255.0),
            b: pigment(b * 255.0),
            w: 0,
        }
    }

    /// Convert RGB to HSV: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
    pub fn to_hsv(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let s = if max == 0.0 { 0.0 } else { delta / max };

        (h.rem_euclid(360.0), s, max)
    }
}
