/// An RGB fill color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};

impl Color {
    /// Parses a `#RRGGBB` string. Malformed input silently degrades to black;
    /// color is cosmetic and never worth failing a placement over.
    pub fn from_hex(hex: &str) -> Color {
        Color::try_from_hex(hex).unwrap_or(BLACK)
    }

    fn try_from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let n = u32::from_str_radix(digits, 16).ok()?;
        Some(Color {
            r: f64::from((n >> 16) & 0xff) / 255.0,
            g: f64::from((n >> 8) & 0xff) / 255.0,
            b: f64::from(n & 0xff) / 255.0,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_channels() {
        let c = Color::from_hex("#FF0000");
        assert_eq!(c, Color { r: 1.0, g: 0.0, b: 0.0 });

        let c = Color::from_hex("#336699");
        assert_eq!(c.r, 0x33 as f64 / 255.0);
        assert_eq!(c.g, 0x66 as f64 / 255.0);
        assert_eq!(c.b, 0x99 as f64 / 255.0);
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for hex in ["#000000", "#FFFFFF", "#7F7F7F"] {
            let c = Color::from_hex(hex);
            for ch in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&ch));
            }
        }
    }

    #[test]
    fn malformed_degrades_to_black() {
        assert_eq!(Color::from_hex("FF0000"), BLACK);
        assert_eq!(Color::from_hex("#F00"), BLACK);
        assert_eq!(Color::from_hex("#GGHHII"), BLACK);
        assert_eq!(Color::from_hex(""), BLACK);
    }
}
