/// Surface descriptions for meshes and points
use nalgebra::Vector3;

/// Linear RGB colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.r, self.g, self.b)
    }

    pub fn from_vector(v: Vector3<f32>) -> Self {
        Self::new(v.x.clamp(0.0, 1.0), v.y.clamp(0.0, 1.0), v.z.clamp(0.0, 1.0))
    }

    /// Rec. 709 relative luminance
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }
}

/// Lit surface material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    pub fn orb() -> Self {
        Self {
            color: Color::from_hex(0x8b5cf6),
            emissive: Color::from_hex(0x2d0d6a),
            metalness: 0.6,
            roughness: 0.2,
        }
    }

    pub fn ring() -> Self {
        Self {
            color: Color::from_hex(0x38bdf8),
            emissive: Color::from_hex(0x0c4a6e),
            metalness: 0.4,
            roughness: 0.3,
        }
    }

    pub fn shard() -> Self {
        Self {
            color: Color::from_hex(0xf472b6),
            emissive: Color::from_hex(0x9d174d),
            metalness: 0.0,
            roughness: 0.4,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            emissive: Color::BLACK,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

/// Unlit point sprite material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    pub color: Color,
    /// World-space size, attenuated by distance
    pub size: f32,
    pub opacity: f32,
}

impl PointMaterial {
    pub fn star() -> Self {
        Self {
            color: Color::WHITE,
            size: 0.05,
            opacity: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let color = Color::from_hex(0xff8000);
        assert_eq!(color.to_rgb8(), (255, 128, 0));
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
    }

    #[test]
    fn test_from_vector_clamps() {
        let color = Color::from_vector(Vector3::new(1.5, -0.2, 0.5));
        assert_eq!(color, Color::new(1.0, 0.0, 0.5));
    }
}
