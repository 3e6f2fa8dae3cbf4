//! Drawing-surface sizing.
//!
//! The backing store of a canvas is its layout size multiplied by the
//! device pixel ratio, computed once before the driven engine is built.

/// Backing-store dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Compute the backing store from a CSS layout size and a device pixel ratio.
    ///
    /// Fractional results truncate toward zero, the way a canvas `width`
    /// attribute converts a number. A non-finite or non-positive ratio is
    /// treated as `1.0`; negative or non-finite layout sizes become `0`.
    pub fn from_layout(layout_width: f64, layout_height: f64, device_pixel_ratio: f64) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            log::warn!("invalid device pixel ratio {device_pixel_ratio}, using 1.0");
            1.0
        };
        Self {
            width: to_pixels(layout_width * ratio),
            height: to_pixels(layout_height * ratio),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_f64(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

fn to_pixels(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX and truncates the fraction.
    v as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplies_layout_by_ratio() {
        let size = SurfaceSize::from_layout(400.0, 300.0, 2.0);
        assert_eq!(size, SurfaceSize::new(800, 600));
    }

    #[test]
    fn fractional_ratio_truncates() {
        let size = SurfaceSize::from_layout(333.0, 101.0, 1.5);
        assert_eq!(size, SurfaceSize::new(499, 151));
    }

    #[test]
    fn bad_ratio_falls_back_to_one() {
        assert_eq!(SurfaceSize::from_layout(10.0, 20.0, 0.0), SurfaceSize::new(10, 20));
        assert_eq!(SurfaceSize::from_layout(10.0, 20.0, f64::NAN), SurfaceSize::new(10, 20));
    }

    #[test]
    fn negative_layout_is_empty() {
        let size = SurfaceSize::from_layout(-5.0, 20.0, 2.0);
        assert_eq!(size.width, 0);
        assert!(size.is_empty());
    }
}
