/// Light rig and the shading model shared by every renderer
use nalgebra::{Point3, Vector3};

use crate::material::{Color, Material};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
}

/// One ambient term plus any number of point lights
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub points: Vec<PointLight>,
}

impl Lighting {
    /// White fill with a violet key light and a cyan rim light
    pub fn studio() -> Self {
        Self {
            ambient: Color::WHITE,
            ambient_intensity: 0.6,
            points: vec![
                PointLight {
                    color: Color::from_hex(0x8b5cf6),
                    intensity: 1.2,
                    position: Point3::new(4.0, 4.0, 6.0),
                },
                PointLight {
                    color: Color::from_hex(0x22d3ee),
                    intensity: 1.1,
                    position: Point3::new(-5.0, 2.0, -2.0),
                },
            ],
        }
    }

    /// Shade a surface point seen from `eye`.
    ///
    /// Ambient + Lambert diffuse + Blinn-Phong specular + emissive. Rougher
    /// surfaces get a weaker, wider highlight; metals tint the highlight with
    /// the base colour and darken the diffuse term. The WebGL fragment shader
    /// mirrors this function.
    pub fn shade(
        &self,
        material: &Material,
        position: &Point3<f32>,
        normal: &Vector3<f32>,
        eye: &Point3<f32>,
    ) -> Color {
        let base = material.color.to_vector();
        let n = normal.normalize();
        let view = (eye - position).normalize();

        let diffuse_weight = 1.0 - material.metalness * 0.5;
        let shininess = 2.0 / (material.roughness * material.roughness).max(1e-3);
        let specular_color = Vector3::repeat(0.04).lerp(&base, material.metalness);
        let specular_strength = 1.0 - material.roughness;

        let mut light = base.component_mul(&self.ambient.to_vector()) * self.ambient_intensity;

        for point in &self.points {
            let to_light = (point.position - position).normalize();
            let lambert = n.dot(&to_light).max(0.0);
            if lambert <= 0.0 {
                continue;
            }

            let radiance = point.color.to_vector() * point.intensity;
            light += base.component_mul(&radiance) * (lambert * diffuse_weight);

            let half = (to_light + view).normalize();
            let highlight = n.dot(&half).max(0.0).powf(shininess) * specular_strength;
            light += specular_color.component_mul(&radiance) * highlight;
        }

        light += material.emissive.to_vector();
        Color::from_vector(light)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::studio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_rig() {
        let lighting = Lighting::studio();
        assert_eq!(lighting.points.len(), 2);
        assert!((lighting.ambient_intensity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_lit_side_is_brighter() {
        let lighting = Lighting::studio();
        let material = Material::shard();
        let eye = Point3::new(0.0, 1.0, 6.0);
        let position = Point3::new(0.0, 0.0, 1.0);

        // Facing the key light versus facing straight down
        let lit = lighting.shade(&material, &position, &Vector3::new(0.5, 0.5, 0.7), &eye);
        let unlit = lighting.shade(&material, &position, &Vector3::new(0.0, -1.0, 0.0), &eye);
        assert!(lit.luminance() > unlit.luminance());
    }

    #[test]
    fn test_emissive_floor() {
        let lighting = Lighting {
            ambient: Color::BLACK,
            ambient_intensity: 0.0,
            points: Vec::new(),
        };
        let material = Material::orb();
        let color = lighting.shade(
            &material,
            &Point3::origin(),
            &Vector3::y(),
            &Point3::new(0.0, 0.0, 5.0),
        );
        assert_eq!(color, Color::from_vector(material.emissive.to_vector()));
    }
}
