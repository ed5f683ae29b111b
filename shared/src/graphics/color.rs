/// One pixel as stored in the framebuffer: red, green, blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Applies `mask` to a raw color and splits the low 24 bits into channels.
    pub fn from_raw(raw: i64, mask: u32) -> Self {
        let color = raw & mask as i64;
        Self {
            r: ((color >> 16) & 0xff) as u8,
            g: ((color >> 8) & 0xff) as u8,
            b: (color & 0xff) as u8,
        }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channel order used on disk by 24-bit bitmaps.
    pub fn to_bgr(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }
}
