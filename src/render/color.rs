/// A draw color; alpha is only used to skip fully transparent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse from hex string like "#ff0000" or "ff000080"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if hex.len() == 8 { channel(6)? } else { 255 };

        Some(Self { r, g, b, a })
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_with_hash() {
        let color = Color::from_hex("#ff5500").unwrap();
        assert_eq!(color, Color::rgb(255, 85, 0));
    }

    #[test]
    fn from_hex_parses_alpha() {
        let color = Color::from_hex("00ff0000").unwrap();
        assert_eq!(color, Color::rgba(0, 255, 0, 0));
        assert!(color.is_transparent());
    }

    #[test]
    fn from_hex_returns_none_for_invalid() {
        assert!(Color::from_hex("fff").is_none());
        assert!(Color::from_hex("gggggg").is_none());
        assert!(Color::from_hex("ééé").is_none());
    }
}
