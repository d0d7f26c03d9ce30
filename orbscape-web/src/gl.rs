/// WebGL2 renderer for the orbscape scene.
///
/// Meshes are uploaded once, keyed by their shared `Arc`, as interleaved
/// position + normal buffers. Stars are a single static point buffer whose
/// rotation is applied through the model matrix.

use log::debug;
use nalgebra::Matrix4;
use orbscape_core::{
    Camera, Error, FrameSink, Lighting, Material, Mesh, Result, Scene, StarField, Viewport,
};
use std::collections::HashMap;
use std::sync::Arc;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

/// Point lights the mesh shader has slots for
const MAX_LIGHTS: usize = 4;

const MESH_VERTEX_SHADER: &str = r#"#version 300 es
in vec3 a_position;
in vec3 a_normal;

uniform mat4 u_model;
uniform mat4 u_view_projection;

out vec3 v_world;
out vec3 v_normal;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_projection * world;
}
"#;

// Mirrors `Lighting::shade`
const MESH_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

#define MAX_LIGHTS 4

in vec3 v_world;
in vec3 v_normal;

uniform vec3 u_eye;
uniform vec3 u_color;
uniform vec3 u_emissive;
uniform float u_metalness;
uniform float u_roughness;
uniform vec3 u_ambient;
uniform int u_light_count;
uniform vec3 u_light_position[MAX_LIGHTS];
uniform vec3 u_light_radiance[MAX_LIGHTS];

out vec4 out_color;

void main() {
    vec3 n = normalize(v_normal);
    vec3 view = normalize(u_eye - v_world);

    float diffuse_weight = 1.0 - u_metalness * 0.5;
    float shininess = 2.0 / max(u_roughness * u_roughness, 1e-3);
    vec3 specular_color = mix(vec3(0.04), u_color, u_metalness);
    float specular_strength = 1.0 - u_roughness;

    vec3 light = u_color * u_ambient;
    for (int i = 0; i < MAX_LIGHTS; i++) {
        if (i >= u_light_count) {
            break;
        }
        vec3 to_light = normalize(u_light_position[i] - v_world);
        float lambert = max(dot(n, to_light), 0.0);
        if (lambert <= 0.0) {
            continue;
        }
        light += u_color * u_light_radiance[i] * (lambert * diffuse_weight);

        vec3 half_vector = normalize(to_light + view);
        float highlight = pow(max(dot(n, half_vector), 0.0), shininess) * specular_strength;
        light += specular_color * u_light_radiance[i] * highlight;
    }

    light += u_emissive;
    out_color = vec4(clamp(light, 0.0, 1.0), 1.0);
}
"#;

const POINT_VERTEX_SHADER: &str = r#"#version 300 es
in vec3 a_position;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_scale;

void main() {
    vec4 eye_space = u_view * u_model * vec4(a_position, 1.0);
    gl_PointSize = u_size * (u_scale / -eye_space.z);
    gl_Position = u_projection * eye_space;
}
"#;

const POINT_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

uniform vec3 u_color;
uniform float u_opacity;

out vec4 out_color;

void main() {
    out_color = vec4(u_color, u_opacity);
}
"#;

const FLOATS_PER_VERTEX: usize = 6;

/// Flatten a mesh to `[px, py, pz, nx, ny, nz]` per vertex
pub fn interleave(mesh: &Mesh) -> Vec<f32> {
    let mut data = Vec::with_capacity(mesh.triangle_count() * 3 * FLOATS_PER_VERTEX);
    for triangle in &mesh.triangles {
        for vertex in &triangle.vertices {
            data.extend_from_slice(vertex.position.coords.as_slice());
            data.extend_from_slice(vertex.normal.as_slice());
        }
    }
    data
}

/// Flatten points to `[x, y, z]` triples
pub fn flatten_points(stars: &StarField) -> Vec<f32> {
    stars
        .points
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect()
}

struct GpuGeometry {
    vao: WebGlVertexArrayObject,
    _buffer: WebGlBuffer,
    count: i32,
}

struct MeshProgram {
    program: WebGlProgram,
    model: Option<WebGlUniformLocation>,
    view_projection: Option<WebGlUniformLocation>,
    eye: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    metalness: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    light_count: Option<WebGlUniformLocation>,
    light_position: Option<WebGlUniformLocation>,
    light_radiance: Option<WebGlUniformLocation>,
}

impl MeshProgram {
    fn new(gl: &Gl) -> Result<Self> {
        let program = link_program(gl, MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let uniform = |name: &str| gl.get_uniform_location(&program, name);
        Ok(Self {
            model: uniform("u_model"),
            view_projection: uniform("u_view_projection"),
            eye: uniform("u_eye"),
            color: uniform("u_color"),
            emissive: uniform("u_emissive"),
            metalness: uniform("u_metalness"),
            roughness: uniform("u_roughness"),
            ambient: uniform("u_ambient"),
            light_count: uniform("u_light_count"),
            light_position: uniform("u_light_position[0]"),
            light_radiance: uniform("u_light_radiance[0]"),
            program,
        })
    }

    fn set_lighting(&self, gl: &Gl, lighting: &Lighting, camera: &Camera) {
        let ambient = lighting.ambient.to_vector() * lighting.ambient_intensity;
        gl.uniform3f(self.ambient.as_ref(), ambient.x, ambient.y, ambient.z);
        gl.uniform3f(
            self.eye.as_ref(),
            camera.position.x,
            camera.position.y,
            camera.position.z,
        );

        let lights = &lighting.points[..lighting.points.len().min(MAX_LIGHTS)];
        let positions: Vec<f32> = lights
            .iter()
            .flat_map(|l| [l.position.x, l.position.y, l.position.z])
            .collect();
        let radiance: Vec<f32> = lights
            .iter()
            .flat_map(|l| {
                let r = l.color.to_vector() * l.intensity;
                [r.x, r.y, r.z]
            })
            .collect();

        gl.uniform1i(self.light_count.as_ref(), lights.len() as i32);
        if !lights.is_empty() {
            gl.uniform3fv_with_f32_array(self.light_position.as_ref(), &positions);
            gl.uniform3fv_with_f32_array(self.light_radiance.as_ref(), &radiance);
        }
    }

    fn set_material(&self, gl: &Gl, material: &Material) {
        let (c, e) = (material.color, material.emissive);
        gl.uniform3f(self.color.as_ref(), c.r, c.g, c.b);
        gl.uniform3f(self.emissive.as_ref(), e.r, e.g, e.b);
        gl.uniform1f(self.metalness.as_ref(), material.metalness);
        gl.uniform1f(self.roughness.as_ref(), material.roughness);
    }
}

struct PointProgram {
    program: WebGlProgram,
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    size: Option<WebGlUniformLocation>,
    scale: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

impl PointProgram {
    fn new(gl: &Gl) -> Result<Self> {
        let program = link_program(gl, POINT_VERTEX_SHADER, POINT_FRAGMENT_SHADER)?;
        let uniform = |name: &str| gl.get_uniform_location(&program, name);
        Ok(Self {
            model: uniform("u_model"),
            view: uniform("u_view"),
            projection: uniform("u_projection"),
            size: uniform("u_size"),
            scale: uniform("u_scale"),
            color: uniform("u_color"),
            opacity: uniform("u_opacity"),
            program,
        })
    }
}

/// Draws the scene into a WebGL2 canvas
pub struct WebGlRenderer {
    gl: Gl,
    canvas: HtmlCanvasElement,
    mesh_program: MeshProgram,
    point_program: PointProgram,
    meshes: HashMap<usize, GpuGeometry>,
    stars: Option<GpuGeometry>,
    drawing_buffer: (u32, u32),
}

impl WebGlRenderer {
    pub fn new(canvas: HtmlCanvasElement, gl: Gl) -> Result<Self> {
        let mesh_program = MeshProgram::new(&gl)?;
        let point_program = PointProgram::new(&gl)?;

        gl.enable(Gl::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            gl,
            canvas,
            mesh_program,
            point_program,
            meshes: HashMap::new(),
            stars: None,
            drawing_buffer: (1, 1),
        })
    }

    fn upload_mesh(&mut self, mesh: &Arc<Mesh>) -> Result<()> {
        let key = Arc::as_ptr(mesh) as usize;
        if self.meshes.contains_key(&key) {
            return Ok(());
        }

        let program = &self.mesh_program.program;
        let position = self.gl.get_attrib_location(program, "a_position");
        let normal = self.gl.get_attrib_location(program, "a_normal");
        let data = interleave(mesh);
        let stride = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as i32;

        let geometry = upload(
            &self.gl,
            &data,
            &[(position, 0), (normal, 3 * std::mem::size_of::<f32>() as i32)],
            stride,
            (data.len() / FLOATS_PER_VERTEX) as i32,
        )?;
        debug!("Uploaded mesh with {} vertices", geometry.count);
        self.meshes.insert(key, geometry);
        Ok(())
    }

    fn upload_stars(&mut self, stars: &StarField) -> Result<()> {
        if self.stars.is_some() {
            return Ok(());
        }

        let position = self
            .gl
            .get_attrib_location(&self.point_program.program, "a_position");
        let data = flatten_points(stars);
        let stride = (3 * std::mem::size_of::<f32>()) as i32;

        let geometry = upload(&self.gl, &data, &[(position, 0)], stride, (data.len() / 3) as i32)?;
        debug!("Uploaded {} stars", geometry.count);
        self.stars = Some(geometry);
        Ok(())
    }

    fn draw_meshes(&self, scene: &Scene, camera: &Camera) {
        let gl = &self.gl;
        let program = &self.mesh_program;
        gl.use_program(Some(&program.program));
        gl.depth_mask(true);
        gl.disable(Gl::BLEND);

        program.set_lighting(gl, &scene.lighting, camera);
        set_matrix(gl, program.view_projection.as_ref(), &camera.view_projection());

        for drawable in scene.drawables() {
            let key = Arc::as_ptr(&drawable.object.mesh) as usize;
            let Some(geometry) = self.meshes.get(&key) else {
                continue;
            };
            program.set_material(gl, &drawable.object.material);
            set_matrix(gl, program.model.as_ref(), &drawable.world);

            gl.bind_vertex_array(Some(&geometry.vao));
            gl.draw_arrays(Gl::TRIANGLES, 0, geometry.count);
        }
        gl.bind_vertex_array(None);
    }

    fn draw_stars(&self, stars: &StarField, camera: &Camera) {
        let Some(geometry) = &self.stars else {
            return;
        };
        let gl = &self.gl;
        let program = &self.point_program;
        gl.use_program(Some(&program.program));

        // Transparent sprites: blend, but leave depth untouched
        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
        gl.depth_mask(false);

        set_matrix(gl, program.model.as_ref(), &stars.transform.matrix());
        set_matrix(gl, program.view.as_ref(), &camera.view_matrix());
        set_matrix(gl, program.projection.as_ref(), &camera.projection_matrix());

        let material = &stars.material;
        gl.uniform1f(program.size.as_ref(), material.size);
        gl.uniform1f(program.scale.as_ref(), self.drawing_buffer.1 as f32 / 2.0);
        gl.uniform3f(
            program.color.as_ref(),
            material.color.r,
            material.color.g,
            material.color.b,
        );
        gl.uniform1f(program.opacity.as_ref(), material.opacity);

        gl.bind_vertex_array(Some(&geometry.vao));
        gl.draw_arrays(Gl::POINTS, 0, geometry.count);
        gl.bind_vertex_array(None);
        gl.depth_mask(true);
    }
}

impl FrameSink for WebGlRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera, _viewport: &Viewport) -> Result<()> {
        for drawable in scene.drawables() {
            self.upload_mesh(&drawable.object.mesh)?;
        }
        self.upload_stars(&scene.stars)?;

        if self.gl.is_context_lost() {
            return Err(Error::Context("WebGL context lost".to_string()));
        }

        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        self.draw_meshes(scene, camera);
        self.draw_stars(&scene.stars, camera);
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) -> Result<()> {
        let (width, height) = viewport.drawing_buffer_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let style = self.canvas.style();
        let css = |property: &str, value: u32| {
            style
                .set_property(property, &format!("{}px", value))
                .map_err(|e| Error::Surface(format!("failed to style canvas: {:?}", e)))
        };
        css("width", viewport.width)?;
        css("height", viewport.height)?;

        self.gl.viewport(0, 0, width as i32, height as i32);
        self.drawing_buffer = (width, height);
        Ok(())
    }
}

fn set_matrix(gl: &Gl, location: Option<&WebGlUniformLocation>, matrix: &Matrix4<f32>) {
    // nalgebra is column-major, as GL expects
    gl.uniform_matrix4fv_with_f32_array(location, false, matrix.as_slice());
}

fn upload(
    gl: &Gl,
    data: &[f32],
    attributes: &[(i32, i32)],
    stride: i32,
    count: i32,
) -> Result<GpuGeometry> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| Error::Render("failed to create vertex array".to_string()))?;
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| Error::Render("failed to create buffer".to_string()))?;

    gl.bind_vertex_array(Some(&vao));
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytemuck::cast_slice(data), Gl::STATIC_DRAW);

    for &(location, offset) in attributes {
        // -1 means the attribute was optimized out of the program
        if location < 0 {
            continue;
        }
        gl.enable_vertex_attrib_array(location as u32);
        gl.vertex_attrib_pointer_with_i32(location as u32, 3, Gl::FLOAT, false, stride, offset);
    }

    gl.bind_vertex_array(None);
    gl.bind_buffer(Gl::ARRAY_BUFFER, None);

    Ok(GpuGeometry {
        vao,
        _buffer: buffer,
        count,
    })
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Shader("unable to create shader object".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown error compiling shader".to_string());
        gl.delete_shader(Some(&shader));
        Err(Error::Shader(log))
    }
}

fn link_program(gl: &Gl, vertex_source: &str, fragment_source: &str) -> Result<WebGlProgram> {
    let vertex = compile_shader(gl, Gl::VERTEX_SHADER, vertex_source)?;
    let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment_source)?;

    let program = gl
        .create_program()
        .ok_or_else(|| Error::Shader("unable to create program object".to_string()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    // Shaders are owned by the program once linked
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "unknown error linking program".to_string());
        gl.delete_program(Some(&program));
        Err(Error::Shader(log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbscape_core::SceneConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_interleave_layout() {
        let mesh = Mesh::cone(0.12, 0.4, 5);
        let data = interleave(&mesh);
        assert_eq!(data.len(), mesh.triangle_count() * 3 * FLOATS_PER_VERTEX);

        let first = &mesh.triangles[0].vertices[0];
        assert_eq!(&data[0..3], first.position.coords.as_slice());
        assert_eq!(&data[3..6], first.normal.as_slice());
    }

    #[test]
    fn test_flatten_points() {
        let scene = Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(4));
        let data = flatten_points(&scene.stars);
        assert_eq!(data.len(), 600 * 3);
        assert_eq!(data[3], scene.stars.points[1].x);
    }

    #[test]
    fn test_shader_light_slots_match() {
        assert!(MESH_FRAGMENT_SHADER.contains(&format!("#define MAX_LIGHTS {}", MAX_LIGHTS)));
        assert!(Lighting::studio().points.len() <= MAX_LIGHTS);
    }
}
