//! GPU device + surface management.
//!
//! Creates the wgpu instance, adapter, device and queue, owns the window
//! surface, and hands out one `GpuFrame` per presented frame.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
