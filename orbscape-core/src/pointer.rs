/// Pointer offset from the viewport centre
use crate::viewport::Viewport;

/// Normalized pointer offset: `(-1, -1)` is the top-left corner, `(1, 1)` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn centered() -> Self {
        Self::default()
    }

    /// Map absolute client coordinates onto `[-1, 1]` for each axis.
    pub fn from_client(client_x: f32, client_y: f32, viewport: &Viewport) -> Self {
        Self {
            x: normalize(client_x, viewport.width),
            y: normalize(client_y, viewport.height),
        }
    }
}

fn normalize(client: f32, extent: u32) -> f32 {
    ((client / extent as f32 - 0.5) * 2.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_and_centre() {
        let viewport = Viewport::new(1280, 720);

        assert_eq!(PointerState::from_client(0.0, 0.0, &viewport), PointerState::new(-1.0, -1.0));
        assert_eq!(PointerState::from_client(1280.0, 720.0, &viewport), PointerState::new(1.0, 1.0));
        assert_eq!(PointerState::from_client(640.0, 360.0, &viewport), PointerState::centered());
    }

    #[test]
    fn test_quarter_points() {
        let viewport = Viewport::new(400, 200);
        let pointer = PointerState::from_client(100.0, 150.0, &viewport);
        assert!((pointer.x + 0.5).abs() < 1e-6);
        assert!((pointer.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_outside_surface_is_clamped() {
        let viewport = Viewport::new(100, 100);
        let pointer = PointerState::from_client(-50.0, 250.0, &viewport);
        assert_eq!(pointer, PointerState::new(-1.0, 1.0));
    }
}
