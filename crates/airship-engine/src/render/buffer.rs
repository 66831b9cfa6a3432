use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::ctx::RenderCtx;
use super::frame::Frame;

/// Smallest GPU allocation made for a buffer, in bytes.
pub const MIN_BUFFER_SIZE: u64 = 256;

/// Process-unique buffer identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(u64);

impl BufferId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer #{}", self.0)
    }
}

/// Capacity to allocate so `required` bytes fit.
///
/// Never shrinks; grows to the next power of two, at least `MIN_BUFFER_SIZE`.
pub fn grow_capacity(current: u64, required: u64) -> u64 {
    if required <= current {
        return current;
    }
    required.next_power_of_two().max(MIN_BUFFER_SIZE)
}

#[inline]
fn align4(n: u64) -> u64 {
    (n + 3) & !3
}

/// `bytes` zero-padded to a multiple of `wgpu::COPY_BUFFER_ALIGNMENT`.
fn padded(bytes: &[u8]) -> Cow<'_, [u8]> {
    let len = align4(bytes.len() as u64) as usize;
    if len == bytes.len() {
        Cow::Borrowed(bytes)
    } else {
        let mut tail = bytes.to_vec();
        tail.resize(len, 0);
        Cow::Owned(tail)
    }
}

/// Records a copy of `bytes` to the start of `dst` into `encoder`.
///
/// The copy runs in encoder order, so passes recorded before it read the old
/// contents and passes recorded after it read `bytes`.
pub(crate) fn record_copy(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    dst: &wgpu::Buffer,
    bytes: &[u8],
) {
    let contents = padded(bytes);
    let staging = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("airship staging"),
        contents: &contents,
        usage: wgpu::BufferUsages::COPY_SRC,
    });
    encoder.copy_buffer_to_buffer(&staging, 0, dst, 0, contents.len() as u64);
}

struct BufferInner {
    id: BufferId,
    label: Option<String>,
    usage: wgpu::BufferUsages,
    raw: RefCell<Option<Rc<wgpu::Buffer>>>,
    capacity: Cell<u64>,
    len: Cell<u64>,
}

/// Shared handle to a GPU buffer holding vertex data.
///
/// Clones refer to the same storage, so several streams (and meshes) can read
/// from one buffer. GPU memory is allocated on the first non-empty `update`
/// and reallocated when data outgrows it.
#[derive(Clone)]
pub struct Buffer {
    inner: Rc<BufferInner>,
}

impl Buffer {
    /// Unallocated vertex buffer.
    pub fn new() -> Self {
        Self::with_usage(None, wgpu::BufferUsages::VERTEX)
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self::with_usage(Some(label.into()), wgpu::BufferUsages::VERTEX)
    }

    /// Unallocated buffer with extra usages. `COPY_DST` is always added.
    pub fn with_usage(label: Option<String>, usage: wgpu::BufferUsages) -> Self {
        Self {
            inner: Rc::new(BufferInner {
                id: BufferId::next(),
                label,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                raw: RefCell::new(None),
                capacity: Cell::new(0),
                len: Cell::new(0),
            }),
        }
    }

    pub fn id(&self) -> BufferId {
        self.inner.id
    }

    /// Bytes of valid data.
    pub fn len(&self) -> u64 {
        self.inner.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes allocated on the GPU.
    pub fn capacity(&self) -> u64 {
        self.inner.capacity.get()
    }

    pub fn is_allocated(&self) -> bool {
        self.inner.raw.borrow().is_some()
    }

    /// Replaces the buffer contents with `bytes` through the queue.
    ///
    /// Queue writes land before the next submitted command buffer runs, so
    /// every draw recorded in the current frame sees the last value written.
    /// Use `upload` to change the data between draws of one frame.
    pub fn update(&self, ctx: &RenderCtx<'_>, bytes: &[u8]) {
        let Some(raw) = self.reserve(ctx, bytes.len() as u64) else {
            return;
        };
        ctx.queue.write_buffer(&raw, 0, &padded(bytes));
        self.inner.len.set(bytes.len() as u64);
    }

    /// Typed convenience over `update`.
    pub fn update_slice<T: Pod>(&self, ctx: &RenderCtx<'_>, data: &[T]) {
        self.update(ctx, bytemuck::cast_slice(data));
    }

    /// Replaces the buffer contents with `bytes` in frame order.
    ///
    /// The copy is recorded into the frame's encoder: draws already recorded
    /// read the previous contents, later draws read `bytes`.
    pub fn upload(&self, frame: &mut Frame<'_>, bytes: &[u8]) {
        let ctx = frame.ctx;
        self.record(&ctx, frame.target.encoder, bytes);
    }

    /// Typed convenience over `upload`.
    pub fn upload_slice<T: Pod>(&self, frame: &mut Frame<'_>, data: &[T]) {
        self.upload(frame, bytemuck::cast_slice(data));
    }

    pub(crate) fn record(&self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder, bytes: &[u8]) {
        let Some(raw) = self.reserve(ctx, bytes.len() as u64) else {
            return;
        };
        record_copy(ctx.device, encoder, &raw, bytes);
        self.inner.len.set(bytes.len() as u64);
    }

    /// Makes room for `len` bytes, allocating or growing the GPU buffer.
    ///
    /// Returns `None` for an empty write, which only resets the length.
    fn reserve(&self, ctx: &RenderCtx<'_>, len: u64) -> Option<Rc<wgpu::Buffer>> {
        let inner = &self.inner;

        if len == 0 {
            inner.len.set(0);
            return None;
        }

        let padded = align4(len);
        if inner.raw.borrow().is_none() || padded > inner.capacity.get() {
            let capacity = grow_capacity(inner.capacity.get(), padded);
            let raw = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: inner.label.as_deref(),
                size: capacity,
                usage: inner.usage,
                mapped_at_creation: false,
            });
            log::debug!("{} allocated {capacity} bytes", inner.id);
            *inner.raw.borrow_mut() = Some(Rc::new(raw));
            inner.capacity.set(capacity);
        }

        self.raw()
    }

    pub(crate) fn raw(&self) -> Option<Rc<wgpu::Buffer>> {
        self.inner.raw.borrow().clone()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
