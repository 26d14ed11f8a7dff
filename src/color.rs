// Simple color struct, created from an unsigned 32 representing RRGGBBAA
// or from a CSS hex string like "#1e3dff"

use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    pub fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`, with or without the leading `#`.
    pub fn from_hex(hex: &str) -> Result<Color, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_owned());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let num = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        match digits.len() {
            3 => {
                // each nibble doubles, 0xf -> 0xff
                let expand = |n: u32| ((n & 0xf) * 0x11) as u8;
                Ok(Color::rgb(expand(num >> 8), expand(num >> 4), expand(num)))
            }
            6 => Ok(Color::from_u32((num << 8) | 0xff)),
            8 => Ok(Color::from_u32(num)),
            _ => Err(invalid()),
        }
    }

    // Opaque CSS form, alpha is applied through the context's global alpha
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub const DEFAULT_PALETTE: [Color; 10] = [
    Color::rgb(0x00, 0x00, 0x8f),
    Color::rgb(0x1e, 0x3d, 0xff),
    Color::rgb(0xff, 0x17, 0x21),
    Color::rgb(0xff, 0xd7, 0x00),
    Color::rgb(0x00, 0xc8, 0x53),
    Color::rgb(0xff, 0x6d, 0x00),
    Color::rgb(0xaa, 0x00, 0xff),
    Color::rgb(0x00, 0xb8, 0xd4),
    Color::rgb(0xf5, 0x00, 0x57),
    Color::rgb(0xff, 0xff, 0xff),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::from_hex("#1e3dff"), Ok(Color::rgb(0x1e, 0x3d, 0xff)));
        assert_eq!(Color::from_hex("fff"), Ok(Color::WHITE));
        assert_eq!(
            Color::from_hex("#ff172180"),
            Ok(Color { r: 0xff, g: 0x17, b: 0x21, a: 0x80 })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#+12345").is_err());
        assert!(Color::from_hex("blue").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn css_drops_alpha() {
        assert_eq!(Color::from_u32(0x00008f40).to_css(), "#00008f");
    }
}
