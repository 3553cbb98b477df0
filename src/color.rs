use std::fmt;

use palette::Srgb;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Fixed chart palette
// ---------------------------------------------------------------------------

/// Ten categorical colours, assigned cyclically to slices and bars.
pub const CHART_PALETTE: [Srgb<u8>; 10] = [
    Srgb::new(0x4e, 0x79, 0xa7),
    Srgb::new(0xf2, 0x8e, 0x2b),
    Srgb::new(0xe1, 0x57, 0x59),
    Srgb::new(0x76, 0xb7, 0xb2),
    Srgb::new(0x59, 0xa1, 0x4f),
    Srgb::new(0xed, 0xc9, 0x49),
    Srgb::new(0xaf, 0x7a, 0xa1),
    Srgb::new(0xff, 0x9d, 0xa7),
    Srgb::new(0x9c, 0x75, 0x5f),
    Srgb::new(0xba, 0xb0, 0xab),
];

/// Alpha applied to scatter points.
pub const POINT_ALPHA: u8 = 0xcc;

// ---------------------------------------------------------------------------
// ChartColor
// ---------------------------------------------------------------------------

/// An sRGB colour with straight alpha. Serializes as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ChartColor {
    pub fn opaque(rgb: Srgb<u8>) -> Self {
        ChartColor {
            red: rgb.red,
            green: rgb.green,
            blue: rgb.blue,
            alpha: u8::MAX,
        }
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        ChartColor { alpha, ..self }
    }

    /// Same colour, fully opaque.
    pub fn without_alpha(self) -> Self {
        self.with_alpha(u8::MAX)
    }

    pub fn rgb(&self) -> Srgb<u8> {
        Srgb::new(self.red, self.green, self.blue)
    }
}

impl fmt::Display for ChartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)?;
        if self.alpha != u8::MAX {
            write!(f, "{:02x}", self.alpha)?;
        }
        Ok(())
    }
}

impl Serialize for ChartColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Palette colour for position `index`, wrapping around.
pub fn cyclic(index: usize) -> ChartColor {
    ChartColor::opaque(CHART_PALETTE[index % CHART_PALETTE.len()])
}

/// Map `value` onto the palette by its position within `[min, max]`.
/// A degenerate range (`max == min`) puts everything on the first colour.
pub fn gradient(value: f64, min: f64, max: f64) -> ChartColor {
    let range = match max - min {
        r if r == 0.0 || r.is_nan() => 1.0,
        r => r,
    };
    let normalized = ((value - min) / range).clamp(0.0, 1.0);
    let index = (normalized * (CHART_PALETTE.len() - 1) as f64).floor() as usize;
    ChartColor::opaque(CHART_PALETTE[index]).with_alpha(POINT_ALPHA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_wraps_after_ten() {
        assert_eq!(cyclic(0), cyclic(10));
        assert_eq!(cyclic(3).to_string(), "#76b7b2");
    }

    #[test]
    fn gradient_spans_palette() {
        assert_eq!(gradient(0.0, 0.0, 9.0).to_string(), "#4e79a7cc");
        assert_eq!(gradient(9.0, 0.0, 9.0).to_string(), "#bab0abcc");
        // 0.5 * 9 = 4.5 → index 4
        assert_eq!(gradient(5.0, 0.0, 10.0), ChartColor::opaque(CHART_PALETTE[4]).with_alpha(POINT_ALPHA));
    }

    #[test]
    fn flat_range_uses_first_colour() {
        assert_eq!(gradient(7.0, 7.0, 7.0).without_alpha(), cyclic(0));
    }

    #[test]
    fn serializes_as_hex() {
        let json = serde_json::to_string(&vec![cyclic(1), cyclic(1).with_alpha(0x20)]).unwrap();
        assert_eq!(json, r##"["#f28e2b","#f28e2b20"]"##);
    }
}
