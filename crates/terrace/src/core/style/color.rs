use std::fmt;

/// A fully resolved 24-bit color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// Red.
    pub const RED: Self = Self::rgb(0xff, 0, 0);
    /// Green.
    pub const GREEN: Self = Self::rgb(0, 0xff, 0);
    /// Blue.
    pub const BLUE: Self = Self::rgb(0, 0, 0xff);

    /// Construct a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Construct a color from a packed `0xRRGGBB` value. Bits above 24 are
    /// ignored.
    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    /// The packed `0xRRGGBB` value.
    pub const fn to_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Self {
        Self::from_u32(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let c = Color::from_u32(0x12ab34);
        assert_eq!(c, Color::rgb(0x12, 0xab, 0x34));
        assert_eq!(c.to_u32(), 0x12ab34);
        assert_eq!(Color::from(0xff12_ab34_u32), c);
        assert_eq!(c.to_string(), "#12ab34");
        assert_eq!(Color::RED.to_u32(), 0xff0000);
    }
}
