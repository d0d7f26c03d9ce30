/// Geometry primitives and procedural mesh generators
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    /// Average of the per-vertex normals, used for smooth shading
    pub fn shading_normal(&self) -> Vector3<f32> {
        let sum = self.vertices[0].normal + self.vertices[1].normal + self.vertices[2].normal;
        if sum.norm_squared() < 1e-12 {
            return self.calculate_normal();
        }
        sum.normalize()
    }

    pub fn centroid(&self) -> Point3<f32> {
        let sum = self.vertices[0].position.coords
            + self.vertices[1].position.coords
            + self.vertices[2].position.coords;
        Point3::from(sum / 3.0)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Add a flat-shaded face whose normal points away from `interior`.
    fn add_outward_face(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, interior: Point3<f32>) {
        let mut normal = (b - a).cross(&(c - a));
        if normal.norm_squared() < 1e-12 {
            return;
        }
        normal = normal.normalize();

        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        let (b, c) = if normal.dot(&(centroid - interior)) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };

        self.add_triangle(Triangle::new(
            Vertex::new(a, normal),
            Vertex::new(b, normal),
            Vertex::new(c, normal),
        ));
    }

    /// Geodesic sphere built by subdividing an icosahedron.
    ///
    /// Every face is split into `(detail + 1)^2` triangles and each vertex is
    /// pushed out to `radius`. Normals are flat.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let base = [
            Point3::new(-1.0, t, 0.0),
            Point3::new(1.0, t, 0.0),
            Point3::new(-1.0, -t, 0.0),
            Point3::new(1.0, -t, 0.0),
            Point3::new(0.0, -1.0, t),
            Point3::new(0.0, 1.0, t),
            Point3::new(0.0, -1.0, -t),
            Point3::new(0.0, 1.0, -t),
            Point3::new(t, 0.0, -1.0),
            Point3::new(t, 0.0, 1.0),
            Point3::new(-t, 0.0, -1.0),
            Point3::new(-t, 0.0, 1.0),
        ];
        const FACES: [[usize; 3]; 20] = [
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        let cols = (detail + 1) as usize;
        let origin = Point3::origin();
        let on_sphere = |p: Point3<f32>| Point3::from(p.coords.normalize() * radius);
        let mut mesh = Self::with_capacity(FACES.len() * cols * cols);

        for [ia, ib, ic] in FACES {
            let (a, b, c) = (base[ia], base[ib], base[ic]);

            // rows[i][j] walks from edge a-b towards apex c
            let mut rows: Vec<Vec<Point3<f32>>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let f = i as f32 / cols as f32;
                let aj = a + (c - a) * f;
                let bj = b + (c - b) * f;
                let span = cols - i;
                let row = (0..=span)
                    .map(|j| {
                        if span == 0 {
                            aj
                        } else {
                            aj + (bj - aj) * (j as f32 / span as f32)
                        }
                    })
                    .collect();
                rows.push(row);
            }

            for i in 0..cols {
                for j in 0..(2 * (cols - i) - 1) {
                    let k = j / 2;
                    let (p0, p1, p2) = if j % 2 == 0 {
                        (rows[i][k + 1], rows[i + 1][k], rows[i][k])
                    } else {
                        (rows[i][k + 1], rows[i + 1][k + 1], rows[i + 1][k])
                    };
                    mesh.add_outward_face(on_sphere(p0), on_sphere(p1), on_sphere(p2), origin);
                }
            }
        }

        mesh
    }

    /// Tube of radius `tube` swept along a (p, q) torus knot of size `radius`.
    ///
    /// Vertex normals point from the knot curve to the tube surface.
    pub fn torus_knot(
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    ) -> Self {
        let curve = |u: f32| -> Vector3<f32> {
            let q_over_p = q as f32 / p as f32 * u;
            let cs = q_over_p.cos();
            Vector3::new(
                radius * (2.0 + cs) * 0.5 * u.cos(),
                radius * (2.0 + cs) * 0.5 * u.sin(),
                radius * q_over_p.sin() * 0.5,
            )
        };

        let ring_len = radial_segments as usize + 1;
        let mut ring_vertices = Vec::with_capacity((tubular_segments as usize + 1) * ring_len);

        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * p as f32 * PI * 2.0;
            let p1 = curve(u);
            let p2 = curve(u + 0.01);

            // Frenet-like frame along the curve
            let tangent = p2 - p1;
            let mut n = p2 + p1;
            let b = tangent.cross(&n).normalize();
            n = b.cross(&tangent).normalize();

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * PI * 2.0;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                let position = p1 + n * cx + b * cy;
                let normal = (position - p1).normalize();
                ring_vertices.push(Vertex::new(Point3::from(position), normal));
            }
        }

        let mut mesh = Self::with_capacity(2 * (tubular_segments * radial_segments) as usize);
        for j in 1..=tubular_segments as usize {
            for i in 1..=radial_segments as usize {
                let a = ring_vertices[ring_len * (j - 1) + (i - 1)];
                let b = ring_vertices[ring_len * j + (i - 1)];
                let c = ring_vertices[ring_len * j + i];
                let d = ring_vertices[ring_len * (j - 1) + i];
                mesh.add_triangle(Triangle::new(a, b, d));
                mesh.add_triangle(Triangle::new(b, c, d));
            }
        }

        mesh
    }

    /// Closed cone centred on the origin with its apex on +Y.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let half = height / 2.0;
        let apex = Point3::new(0.0, half, 0.0);
        let base_center = Point3::new(0.0, -half, 0.0);
        let origin = Point3::origin();

        let rim: Vec<Point3<f32>> = (0..=radial_segments)
            .map(|k| {
                let theta = k as f32 / radial_segments as f32 * PI * 2.0;
                Point3::new(radius * theta.sin(), -half, radius * theta.cos())
            })
            .collect();

        let mut mesh = Self::with_capacity(2 * radial_segments as usize);
        for k in 0..radial_segments as usize {
            mesh.add_outward_face(apex, rim[k], rim[k + 1], origin);
        }
        for k in 0..radial_segments as usize {
            mesh.add_outward_face(base_center, rim[k + 1], rim[k], origin);
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &Mesh, center: Point3<f32>) {
        for triangle in &mesh.triangles {
            let outward = triangle.centroid() - center;
            assert!(triangle.calculate_normal().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_icosahedron_subdivision() {
        let mesh = Mesh::icosahedron(1.2, 2);
        assert_eq!(mesh.triangle_count(), 20 * 9);

        for triangle in &mesh.triangles {
            for vertex in &triangle.vertices {
                assert!((vertex.position.coords.norm() - 1.2).abs() < 1e-4);
            }
        }
        assert_outward(&mesh, Point3::origin());
    }

    #[test]
    fn test_icosahedron_detail_zero() {
        let mesh = Mesh::icosahedron(1.0, 0);
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn test_torus_knot_counts() {
        let mesh = Mesh::torus_knot(1.8, 0.08, 160, 12, 2, 3);
        assert_eq!(mesh.triangle_count(), 2 * 160 * 12);

        for triangle in &mesh.triangles {
            for vertex in &triangle.vertices {
                assert!((vertex.normal.norm() - 1.0).abs() < 1e-3);
                // (2 + cos) * 0.5 * R plus the tube stays within 1.5 * R + tube
                assert!(vertex.position.coords.norm() <= 1.5 * 1.8 + 0.08 + 1e-3);
            }
        }
    }

    #[test]
    fn test_cone_shape() {
        let mesh = Mesh::cone(0.12, 0.4, 5);
        assert_eq!(mesh.triangle_count(), 10);

        let top = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.y)
            .fold(f32::MIN, f32::max);
        assert!((top - 0.2).abs() < 1e-6);
        assert_outward(&mesh, Point3::origin());
    }

    #[test]
    fn test_shading_normal_matches_flat_faces() {
        let mesh = Mesh::cone(0.12, 0.4, 5);
        for triangle in &mesh.triangles {
            assert!((triangle.shading_normal() - triangle.calculate_normal()).norm() < 1e-6);
        }
    }
}
