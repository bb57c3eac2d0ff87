//! 4 字节打包 RGBA 颜色

use crate::error::Result;
use crate::io::{Reader, Writer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
        a: 0xFF,
    };

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_word(word: u32) -> Self {
        Self {
            r: word as u8,
            g: (word >> 8) as u8,
            b: (word >> 16) as u8,
            a: (word >> 24) as u8,
        }
    }

    pub fn to_word(self) -> u32 {
        self.r as u32 | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self::from_word(r.read_u32()?))
    }

    pub fn write(self, w: &mut Writer) {
        w.write_u32(self.to_word());
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R:{} G:{} B:{} A:{}", self.r, self.g, self.b, self.a)
    }
}
