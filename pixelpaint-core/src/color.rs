/// A straight (non-premultiplied) 8-bit sRGB color.
///
/// Equality is exact on all four channels. Flood fill and color replacement rely on this, so there is
/// intentionally no tolerance or normalization of transparent colors.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Debug,
    bytemuck::Pod,
    bytemuck::Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}
impl Color {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
    #[must_use]
    pub const fn as_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
    /// Source-over composite `self` on top of `below`, with the source alpha scaled by `opacity`.
    ///
    /// Integer math throughout, rounding to nearest.
    #[must_use]
    pub fn over(self, below: Self, opacity: crate::util::Opacity) -> Self {
        let src_a = u32::from(self.a) * u32::from(opacity.as_u8());
        // src_a is in 0..=255*255
        if src_a == 0 {
            return below;
        }
        let dst_a = u32::from(below.a) * (255 * 255 - src_a) / (255 * 255);
        let out_a = src_a / 255 + dst_a;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }
        let channel = |s: u8, d: u8| -> u8 {
            let s = u32::from(s) * src_a / 255;
            let d = u32::from(d) * dst_a;
            // Never exceeds 255, both terms are weighted by their share of out_a.
            ((s + d + out_a / 2) / out_a).min(255) as u8
        };
        Self {
            r: channel(self.r, below.r),
            g: channel(self.g, below.g),
            b: channel(self.b, below.b),
            a: out_a.min(255) as u8,
        }
    }
}
impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}
impl From<Color> for [u8; 4] {
    fn from(value: Color) -> Self {
        value.as_array()
    }
}
