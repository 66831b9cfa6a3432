use super::color::Color;

/// Hue/saturation/value color. Hue is in degrees, `[0, 360)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct HsvColor {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: f32,
}

impl HsvColor {
    pub const fn new(h: f32, s: f32, v: f32, a: f32) -> Self {
        Self { h, s, v, a }
    }

    pub fn to_rgb(self) -> Color {
        Color::from(self)
    }
}

impl From<Color> for HsvColor {
    fn from(c: Color) -> Self {
        let v = c.r.max(c.g).max(c.b);
        let chroma = v - c.r.min(c.g).min(c.b);
        let s = if v == 0.0 { 0.0 } else { chroma / v };

        let mut h = 0.0;
        if chroma > 0.0 {
            h = if v == c.r {
                60.0 * (c.g - c.b) / chroma
            } else if v == c.g {
                60.0 * (c.b - c.r) / chroma + 120.0
            } else {
                60.0 * (c.r - c.g) / chroma + 240.0
            };
            if h < 0.0 {
                h += 360.0;
            }
        }

        HsvColor { h, s, v, a: c.a }
    }
}

impl From<HsvColor> for Color {
    fn from(hsv: HsvColor) -> Self {
        let h = hsv.h.rem_euclid(360.0);
        let chroma = hsv.s * hsv.v;
        let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = hsv.v - chroma;

        let (r, g, b) = match h {
            h if h < 60.0 => (chroma, x, 0.0),
            h if h < 120.0 => (x, chroma, 0.0),
            h if h < 180.0 => (0.0, chroma, x),
            h if h < 240.0 => (0.0, x, chroma),
            h if h < 300.0 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        Color::new(r + m, g + m, b + m, hsv.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn hsv_of(c: Color) -> (f32, f32, f32) {
        let hsv = HsvColor::from(c);
        (hsv.h, hsv.s, hsv.v)
    }

    #[test]
    fn primaries_and_greys() {
        assert_eq!(hsv_of(Color::RED), (0.0, 1.0, 1.0));
        assert_eq!(hsv_of(Color::GREEN), (120.0, 1.0, 1.0));
        assert_eq!(hsv_of(Color::BLUE), (240.0, 1.0, 1.0));

        assert_eq!(hsv_of(Color::BLACK), (0.0, 0.0, 0.0));
        assert_eq!(hsv_of(Color::GREY), (0.0, 0.0, 0.5));
        assert_eq!(hsv_of(Color::WHITE), (0.0, 0.0, 1.0));
    }

    #[test]
    fn hsv_to_rgb() {
        let check = |hsv: HsvColor, want: Color| {
            let got = Color::from(hsv);
            assert_abs_diff_eq!(got.r, want.r, epsilon = 1e-6);
            assert_abs_diff_eq!(got.g, want.g, epsilon = 1e-6);
            assert_abs_diff_eq!(got.b, want.b, epsilon = 1e-6);
        };
        check(HsvColor::new(0.0, 1.0, 1.0, 1.0), Color::RED);
        check(HsvColor::new(120.0, 1.0, 1.0, 1.0), Color::GREEN);
        check(HsvColor::new(240.0, 1.0, 1.0, 1.0), Color::BLUE);
        check(HsvColor::new(360.0, 1.0, 1.0, 1.0), Color::RED);
        check(HsvColor::new(-120.0, 1.0, 1.0, 1.0), Color::BLUE);
    }

    #[test]
    fn round_trip_grid() {
        for ri in 0..=5 {
            for gi in 0..=5 {
                for bi in 0..=5 {
                    let c = Color::new(ri as f32 / 5.0, gi as f32 / 5.0, bi as f32 / 5.0, 0.5);
                    let back = c.to_hsv().to_rgb();
                    assert_abs_diff_eq!(back.r, c.r, epsilon = 1e-5);
                    assert_abs_diff_eq!(back.g, c.g, epsilon = 1e-5);
                    assert_abs_diff_eq!(back.b, c.b, epsilon = 1e-5);
                    assert_eq!(back.a, 0.5);
                }
            }
        }
    }
}
