//! Small vector types used as vertex attribute data.

mod vec;

pub use vec::{Vec2, Vec3};
