/// Drawable area in physical pixels.
///
/// An empty viewport means "the whole render target".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Viewport to apply on a target of `target` size.
    ///
    /// Returns `None` when the target itself is empty.
    pub fn fit(self, target: (u32, u32)) -> Option<Viewport> {
        let (tw, th) = target;
        if tw == 0 || th == 0 {
            return None;
        }
        if self.is_empty() {
            return Some(Viewport::new(tw, th));
        }
        Some(Viewport::new(self.width.min(tw), self.height.min(th)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_clamps_to_target() {
        assert_eq!(Viewport::new(1920, 1080).fit((800, 600)), Some(Viewport::new(800, 600)));
        assert_eq!(Viewport::new(640, 480).fit((800, 600)), Some(Viewport::new(640, 480)));
        assert_eq!(Viewport::default().fit((800, 600)), Some(Viewport::new(800, 600)));
        assert_eq!(Viewport::new(10, 10).fit((0, 600)), None);
    }
}
