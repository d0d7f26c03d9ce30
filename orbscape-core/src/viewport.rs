/// Upper bound applied to the host's device pixel ratio
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Size of the drawable surface in host units (CSS pixels, terminal cells)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Zero dimensions are clamped to 1 so the aspect ratio stays finite.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pixel_ratio(width, height, 1.0)
    }

    pub fn with_pixel_ratio(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Device pixel ratio clamped to `(0, MAX_PIXEL_RATIO]`
    pub fn pixel_ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        }
    }

    /// Backing-store size in physical pixels
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width as f64 * ratio).round() as u32,
            (self.height as f64 * ratio).round() as u32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        assert!((Viewport::new(1920, 1080).aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let viewport = Viewport::new(0, 0);
        assert_eq!((viewport.width, viewport.height), (1, 1));
        assert!(viewport.aspect().is_finite());
    }

    #[test]
    fn test_pixel_ratio_clamped_to_two() {
        assert_eq!(Viewport::with_pixel_ratio(100, 100, 3.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::with_pixel_ratio(100, 100, 1.5).pixel_ratio(), 1.5);
        assert_eq!(Viewport::with_pixel_ratio(100, 100, f64::NAN).pixel_ratio(), 1.0);
    }

    #[test]
    fn test_drawing_buffer_size() {
        let viewport = Viewport::with_pixel_ratio(400, 300, 3.0);
        assert_eq!(viewport.drawing_buffer_size(), (800, 600));
    }
}
