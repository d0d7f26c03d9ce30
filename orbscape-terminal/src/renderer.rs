/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use orbscape_core::projection::project_with;
use orbscape_core::{
    Camera, Color, FrameSink, Lighting, Material, Mesh, Scene, StarField, Triangle, Viewport,
};
use std::io::Write;

use crate::CELL_ASPECT;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

const STAR_CHAR: char = '.';

/// ASCII renderer that converts the scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::BLACK; size],
        }
    }

    /// Renderer sized to a terminal viewport (`cols x rows * CELL_ASPECT`)
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self::new(viewport.width as usize, (viewport.height / CELL_ASPECT).max(1) as usize)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::BLACK);
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Count of cells that hold something other than background
    pub fn filled_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    /// Rasterize the whole scene into the buffers
    pub fn render_scene(&mut self, scene: &Scene, camera: &Camera) {
        self.clear();
        let view_projection = camera.view_projection();

        self.render_stars(&scene.stars, &view_projection);
        for drawable in scene.drawables() {
            self.render_mesh(
                &drawable.object.mesh,
                &drawable.object.material,
                &drawable.world,
                &view_projection,
                camera,
                &scene.lighting,
            );
        }
    }

    fn render_stars(&mut self, stars: &StarField, view_projection: &Matrix4<f32>) {
        let mvp = view_projection * stars.transform.matrix();
        let color = Color::from_vector(stars.material.color.to_vector() * stars.material.opacity);

        for point in &stars.points {
            if let Some((x, y, depth)) = project_with(&mvp, point, self.width as u32, self.height as u32) {
                let (x, y) = (x as usize, y as usize);
                if x < self.width && y < self.height {
                    self.plot(x, y, depth, STAR_CHAR, color);
                }
            }
        }
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        world: &Matrix4<f32>,
        view_projection: &Matrix4<f32>,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        let mvp = view_projection * world;
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, material, world, &mvp, camera, lighting);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        material: &Material,
        world: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match project_with(mvp, &vertex.position, self.width as u32, self.height as u32) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Shade once per face in world space
        let position = world.transform_point(&triangle.centroid());
        let normal = world.transform_vector(&triangle.shading_normal());
        let color = lighting.shade(material, &position, &normal, &camera.position);

        // Map brightness to character
        let char_index = (color.luminance() * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        self.rasterize_triangle(&screen_coords, character, color);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x as usize, y as usize, depth, character, color);
                    }
                }
            }
        }
    }

    fn plot(&mut self, x: usize, y: usize, depth: f32, character: char, color: Color) {
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                if c == ' ' {
                    writer.queue(Print(c))?;
                    continue;
                }

                let (r, g, b) = self.color_buffer[idx].to_rgb8();
                writer.queue(SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Plain-text dump of the character buffer, one line per row
    pub fn to_text(&self) -> String {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FrameSink for AsciiRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera, _viewport: &Viewport) -> orbscape_core::Result<()> {
        self.render_scene(scene, camera);
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) -> orbscape_core::Result<()> {
        *self = Self::for_viewport(viewport);
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbscape_core::SceneConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> Scene {
        Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);

        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_scene_fills_centre() {
        let viewport = Viewport::new(80, 48);
        let mut renderer = AsciiRenderer::for_viewport(&viewport);
        assert_eq!(renderer.size(), (80, 24));

        let camera = Camera::scene_default(&viewport);
        renderer.render(&scene(), &camera, &viewport).unwrap();

        // The orb sits just below the eye line, dead centre horizontally
        assert_ne!(renderer.char_at(40, 16), ' ');
        assert!(renderer.filled_cells() > 100);
    }

    #[test]
    fn test_clear_resets_buffers() {
        let viewport = Viewport::new(40, 40);
        let mut renderer = AsciiRenderer::for_viewport(&viewport);
        renderer.render_scene(&scene(), &Camera::scene_default(&viewport));
        assert!(renderer.filled_cells() > 0);

        renderer.clear();
        assert_eq!(renderer.filled_cells(), 0);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.resize(&Viewport::new(120, 60)).unwrap();
        assert_eq!(renderer.size(), (120, 30));
        assert_eq!(renderer.to_text().lines().count(), 30);
    }

    #[test]
    fn test_draw_emits_every_row() {
        let viewport = Viewport::new(20, 10);
        let mut renderer = AsciiRenderer::for_viewport(&viewport);
        renderer.render_scene(&scene(), &Camera::scene_default(&viewport));

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
