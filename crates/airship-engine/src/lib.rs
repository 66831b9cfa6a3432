//! Airship engine crate.
//!
//! Windowed runtime, GPU device layer, color math and the mesh/material
//! renderer. Engine-agnostic building blocks (events, convars, input, timing,
//! logging) live in `airship_core` and are re-exported here.

pub mod core;
pub mod device;
pub mod paint;
pub mod render;
pub mod window;

pub use airship_core::{convar, coords, event, input, logging, time};
