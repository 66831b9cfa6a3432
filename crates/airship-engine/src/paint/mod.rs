//! Color math: blending, interpolation, normalization and HSV conversion.

mod color;
mod hsv;

pub use color::{BlendMode, Color, CompositeMode, NormalizeMode, SMALL_ALPHA};
pub use hsv::HsvColor;
