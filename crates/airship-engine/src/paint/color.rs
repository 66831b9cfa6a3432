use bytemuck::{Pod, Zeroable};

use super::hsv::HsvColor;

/// Alpha below which a blended result is treated as fully transparent.
pub const SMALL_ALPHA: f32 = 1.0e-6;

/// Straight-alpha RGBA color.
///
/// Channels are nominally in `[0, 1]` but blending may push them outside;
/// `normalize` brings them back. `#[repr(C)]` so it can be uploaded as a
/// vertex attribute or uniform directly.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// https://en.wikipedia.org/wiki/Blend_modes
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BlendMode {
    /// Source-over compositing of `fg` onto `bg`.
    #[default]
    Alpha,
    Multiply,
    Add,
    Average,
}

/// https://en.wikipedia.org/wiki/Alpha_compositing
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CompositeMode {
    #[default]
    Over,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum NormalizeMode {
    /// Clamp every channel to `[0, 1]`.
    Clamp,
    /// Divide rgb by the largest channel when it exceeds 1, keeping hue.
    #[default]
    Scale,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const LIGHT_GREY: Color = Color::rgb(0.75, 0.75, 0.75);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const DARK_GREY: Color = Color::rgb(0.25, 0.25, 0.25);

    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);

    pub const CORNFLOWER_BLUE: Color = Color::rgb(100.0 / 255.0, 149.0 / 255.0, 237.0 / 255.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.5, 0.0);

    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates a color from 8-bit channels.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Blends `fg` onto `bg`.
    pub fn blend(bg: Color, fg: Color, mode: BlendMode) -> Color {
        match mode {
            BlendMode::Alpha => {
                let a = fg.a + bg.a * (1.0 - fg.a);
                if a < SMALL_ALPHA {
                    return Color::TRANSPARENT;
                }
                let fg_scale = fg.a / a;
                let bg_scale = bg.a * (1.0 - fg.a) / a;
                Color::new(
                    fg.r * fg_scale + bg.r * bg_scale,
                    fg.g * fg_scale + bg.g * bg_scale,
                    fg.b * fg_scale + bg.b * bg_scale,
                    a,
                )
            }
            BlendMode::Multiply => Color::new(bg.r * fg.r, bg.g * fg.g, bg.b * fg.b, bg.a * fg.a),
            BlendMode::Add => Color::new(
                bg.r + fg.r,
                bg.g + fg.g,
                bg.b + fg.b,
                bg.a.max(fg.a),
            ),
            BlendMode::Average => Color::new(
                (bg.r + fg.r) / 2.0,
                (bg.g + fg.g) / 2.0,
                (bg.b + fg.b) / 2.0,
                bg.a.max(fg.a),
            ),
        }
    }

    pub fn composite(bg: Color, fg: Color, mode: CompositeMode) -> Color {
        match mode {
            CompositeMode::Over => Color::blend(bg, fg, BlendMode::Alpha),
        }
    }

    /// Linear interpolation from `bg` (t = 0) to `fg` (t = 1).
    ///
    /// Alpha is interpolated linearly too, not `max(fg.a * t, bg.a * (1 - t))`.
    pub fn lerp(bg: Color, fg: Color, t: f32) -> Color {
        let s = 1.0 - t;
        Color::new(
            bg.r * s + fg.r * t,
            bg.g * s + fg.g * t,
            bg.b * s + fg.b * t,
            bg.a * s + fg.a * t,
        )
    }

    /// `Clamp` clamps every channel to [0, 1]. `Scale` divides rgb by the
    /// largest rgb channel when it exceeds 1 and clamps alpha; negative
    /// channels are left as they are.
    pub fn normalize(self, mode: NormalizeMode) -> Color {
        match mode {
            NormalizeMode::Clamp => Color::new(
                self.r.clamp(0.0, 1.0),
                self.g.clamp(0.0, 1.0),
                self.b.clamp(0.0, 1.0),
                self.a.clamp(0.0, 1.0),
            ),
            NormalizeMode::Scale => {
                let max = self.r.max(self.g).max(self.b);
                let div = if max > 1.0 { max } else { 1.0 };
                Color::new(
                    self.r / div,
                    self.g / div,
                    self.b / div,
                    self.a.clamp(0.0, 1.0),
                )
            }
        }
    }

    pub fn to_hsv(self) -> HsvColor {
        HsvColor::from(self)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Color::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}
