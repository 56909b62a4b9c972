use plotters::style::RGBColor;

pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Continuous colormaps, approximated by linear interpolation between anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Plasma,
    Viridis,
    Coolwarm,
    YlGnBu,
}

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (84, 2, 163),
    (139, 10, 165),
    (185, 50, 137),
    (219, 92, 104),
    (244, 136, 73),
    (254, 188, 43),
    (240, 249, 33),
];

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (70, 50, 127),
    (54, 92, 141),
    (39, 127, 142),
    (31, 161, 135),
    (74, 194, 109),
    (159, 218, 58),
    (253, 231, 37),
];

const COOLWARM: &[(u8, u8, u8)] = &[
    (59, 76, 192),
    (98, 130, 234),
    (141, 176, 254),
    (184, 208, 249),
    (221, 221, 221),
    (245, 196, 173),
    (244, 154, 123),
    (222, 96, 77),
    (180, 4, 38),
];

const YLGNBU: &[(u8, u8, u8)] = &[
    (255, 255, 217),
    (237, 248, 177),
    (199, 233, 180),
    (127, 205, 187),
    (65, 182, 196),
    (29, 145, 192),
    (34, 94, 168),
    (37, 52, 148),
    (8, 29, 88),
];

impl Colormap {
    fn anchors(self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::Plasma => PLASMA,
            Colormap::Viridis => VIRIDIS,
            Colormap::Coolwarm => COOLWARM,
            Colormap::YlGnBu => YLGNBU,
        }
    }

    /// Colour at `t` in [0, 1]; out-of-range and NaN inputs are clamped to the ends.
    pub fn at(self, t: f64) -> RGBColor {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (anchors.len() - 1) as f64;
        let i = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = pos - i as f64;

        let (a, b) = (anchors[i], anchors[i + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }

    /// `n` discrete colours taken at the interior points of an `n + 2` grid,
    /// so neither extreme of the map is used.
    pub fn discrete(self, n: usize) -> Vec<RGBColor> {
        (1..=n)
            .map(|i| self.at(i as f64 / (n + 1) as f64))
            .collect()
    }
}

/// Black or white, whichever reads better on `bg`.
pub fn contrasting_text(bg: RGBColor) -> RGBColor {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}
