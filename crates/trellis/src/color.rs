/// RGBA color with values in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub const fn transparent() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    /// Build an opaque color from 8-bit channels
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Build a color from 8-bit channels
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Opaque color from a packed `0xRRGGBB` value, as used by `[#rrggbb]` format tags
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Pack the RGB channels back into `0xRRGGBB`
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Alpha as an 8-bit value
    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// with alpha builder method taking u8
    pub fn with_alpha_u8(mut self, alpha: u8) -> Self {
        self.a = alpha as f32 / 255.0;
        self
    }

    /// with alpha builder method taking f32
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Lighten (positive) or darken (negative) each channel by `amount`
    pub fn shade(self, amount: f32) -> Self {
        Self::rgba(
            (self.r + amount).clamp(0.0, 1.0),
            (self.g + amount).clamp(0.0, 1.0),
            (self.b + amount).clamp(0.0, 1.0),
            self.a,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

/// Colors used by the built-in skin and widget defaults
pub mod palette {
    use super::Color;

    pub const WINDOW: Color = Color::rgb8(30, 30, 46);
    pub const SURFACE: Color = Color::rgb8(49, 50, 68);
    pub const SURFACE_RAISED: Color = Color::rgb8(69, 71, 90);
    pub const BORDER: Color = Color::rgb8(108, 112, 134);
    pub const ACCENT: Color = Color::rgb8(137, 180, 250);
    pub const SELECTION: Color = Color::rgba8(180, 190, 254, 96);
    pub const TEXT: Color = Color::rgb8(205, 214, 244);
    pub const TEXT_DIM: Color = Color::rgb8(166, 173, 200);
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);
}
