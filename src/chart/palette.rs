use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

/// 8-bit sRGB colour used by every chart backend.
pub type Rgb = Srgb<u8>;

/// `#rrggbb` form for HTML / CSS.
pub fn hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Srgb::new(r, g, b)
}

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Plotly's default qualitative colour cycle.
const PLOTLY: [Rgb; 10] = [
    rgb(0x63, 0x6e, 0xfa),
    rgb(0xef, 0x55, 0x3b),
    rgb(0x00, 0xcc, 0x96),
    rgb(0xab, 0x63, 0xfa),
    rgb(0xff, 0xa1, 0x5a),
    rgb(0x19, 0xd3, 0xf3),
    rgb(0xff, 0x66, 0x92),
    rgb(0xb6, 0xe8, 0x80),
    rgb(0xff, 0x97, 0xff),
    rgb(0xfe, 0xcb, 0x52),
];

const BLUES: [Rgb; 9] = [
    rgb(247, 251, 255),
    rgb(222, 235, 247),
    rgb(198, 219, 239),
    rgb(158, 202, 225),
    rgb(107, 174, 214),
    rgb(66, 146, 198),
    rgb(33, 113, 181),
    rgb(8, 81, 156),
    rgb(8, 48, 107),
];

const VIRIDIS: [Rgb; 10] = [
    rgb(0x44, 0x01, 0x54),
    rgb(0x48, 0x28, 0x78),
    rgb(0x3e, 0x49, 0x89),
    rgb(0x31, 0x68, 0x8e),
    rgb(0x26, 0x82, 0x8e),
    rgb(0x1f, 0x9e, 0x89),
    rgb(0x35, 0xb7, 0x79),
    rgb(0x6e, 0xce, 0x58),
    rgb(0xb5, 0xde, 0x2b),
    rgb(0xfd, 0xe7, 0x25),
];

const MAKO: [Rgb; 8] = [
    rgb(0x0b, 0x04, 0x05),
    rgb(0x2e, 0x1e, 0x3c),
    rgb(0x41, 0x3d, 0x7b),
    rgb(0x37, 0x65, 0x9e),
    rgb(0x34, 0x8f, 0xa7),
    rgb(0x40, 0xb7, 0xad),
    rgb(0x8a, 0xd9, 0xb1),
    rgb(0xde, 0xf5, 0xe5),
];

/// Sequential scales are sampled inside this window so no bar ends up
/// near-white or near-black.
const SEQUENTIAL_WINDOW: (f32, f32) = (0.25, 0.9);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteChoice {
    #[default]
    Plotly,
    Blues,
    Viridis,
    Mako,
}

impl PaletteChoice {
    pub const ALL: [PaletteChoice; 4] = [
        PaletteChoice::Plotly,
        PaletteChoice::Blues,
        PaletteChoice::Viridis,
        PaletteChoice::Mako,
    ];

    /// `n` colours, one per category in display order.
    ///
    /// The qualitative palette cycles; sequential palettes are spread evenly
    /// across the categories.
    pub fn colors(self, n: usize) -> Vec<Rgb> {
        match self {
            PaletteChoice::Plotly => (0..n).map(|i| PLOTLY[i % PLOTLY.len()]).collect(),
            PaletteChoice::Blues => sample_scale(&BLUES, n),
            PaletteChoice::Viridis => sample_scale(&VIRIDIS, n),
            PaletteChoice::Mako => sample_scale(&MAKO, n),
        }
    }
}

impl fmt::Display for PaletteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaletteChoice::Plotly => "Plotly",
            PaletteChoice::Blues => "Blues",
            PaletteChoice::Viridis => "Viridis",
            PaletteChoice::Mako => "Mako",
        };
        f.write_str(label)
    }
}

impl FromStr for PaletteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaletteChoice::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown palette '{s}' (expected plotly, blues, viridis or mako)"))
    }
}

fn sample_scale(stops: &[Rgb], n: usize) -> Vec<Rgb> {
    let (lo, hi) = SEQUENTIAL_WINDOW;
    (0..n)
        .map(|i| {
            let t = if n == 1 {
                (lo + hi) / 2.0
            } else {
                lo + (hi - lo) * i as f32 / (n - 1) as f32
            };
            interpolate(stops, t)
        })
        .collect()
}

/// Piecewise-linear interpolation through `stops` at `t` in `[0, 1]`,
/// mixed in linear light.
fn interpolate(stops: &[Rgb], t: f32) -> Rgb {
    let segments = (stops.len() - 1) as f32;
    let pos = t.clamp(0.0, 1.0) * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let frac = pos - i as f32;

    let a: LinSrgb = stops[i].into_format::<f32>().into_linear();
    let b: LinSrgb = stops[i + 1].into_format::<f32>().into_linear();
    Srgb::<f32>::from_linear(a.mix(b, frac)).into_format::<u8>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_names_parse_case_insensitively() {
        assert_eq!("viridis".parse::<PaletteChoice>(), Ok(PaletteChoice::Viridis));
        assert_eq!("MAKO".parse::<PaletteChoice>(), Ok(PaletteChoice::Mako));
        assert!("rainbow".parse::<PaletteChoice>().is_err());
    }

    #[test]
    fn plotly_cycles_after_ten() {
        let colors = PaletteChoice::Plotly.colors(12);
        assert_eq!(colors[0], colors[10]);
        assert_eq!(hex(colors[0]), "#636efa");
    }

    #[test]
    fn sequential_palettes_give_one_color_per_bar() {
        for choice in [PaletteChoice::Blues, PaletteChoice::Viridis, PaletteChoice::Mako] {
            let colors = choice.colors(5);
            assert_eq!(colors.len(), 5);
            assert_ne!(colors[0], colors[4], "{choice} should vary across bars");
        }
        assert!(PaletteChoice::Blues.colors(0).is_empty());
        assert_eq!(PaletteChoice::Viridis.colors(1).len(), 1);
    }

    #[test]
    fn interpolation_hits_stops() {
        assert_eq!(interpolate(&VIRIDIS, 0.0), VIRIDIS[0]);
        assert_eq!(interpolate(&VIRIDIS, 1.0), VIRIDIS[9]);
    }
}
