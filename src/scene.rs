//! The cube field scene.
//!
//! One static cube mesh, uploaded once, drawn thousands of times per frame
//! with a single instanced call. The vertex shader spreads and spins the
//! instances using the elapsed-time uniform; the host side only supplies the
//! three transform matrices and the raw clock value.

use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3, vec3};
use glow::HasContext;

use crate::abs::{InitError, Mesh, Shader, ShaderProgram, Vertex};
use crate::settings::Settings;

/// A position-only vertex, tightly packed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeVertex {
    pub position: [f32; 3],
}

impl Vertex for CubeVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            gl.vertex_attrib_pointer_f32(
                0,
                3,
                glow::FLOAT,
                false,
                std::mem::size_of::<Self>() as i32,
                0,
            );
            gl.enable_vertex_attrib_array(0);
        }
    }
}

const fn v(x: f32, y: f32, z: f32) -> CubeVertex {
    CubeVertex {
        position: [x, y, z],
    }
}

/// 36 vertices, 12 triangles, makes a 2x2x2 cube placed at the origin.
pub const CUBE_VERTICES: [CubeVertex; 36] = [
    v(-1.0, 1.0, -1.0),
    v(-1.0, -1.0, -1.0),
    v(1.0, -1.0, -1.0),
    v(1.0, -1.0, -1.0),
    v(1.0, 1.0, -1.0),
    v(-1.0, 1.0, -1.0),
    v(1.0, -1.0, -1.0),
    v(1.0, -1.0, 1.0),
    v(1.0, 1.0, -1.0),
    v(1.0, -1.0, 1.0),
    v(1.0, 1.0, 1.0),
    v(1.0, 1.0, -1.0),
    v(1.0, -1.0, 1.0),
    v(-1.0, -1.0, 1.0),
    v(1.0, 1.0, 1.0),
    v(-1.0, -1.0, 1.0),
    v(-1.0, 1.0, 1.0),
    v(1.0, 1.0, 1.0),
    v(-1.0, -1.0, 1.0),
    v(-1.0, -1.0, -1.0),
    v(-1.0, 1.0, 1.0),
    v(-1.0, -1.0, -1.0),
    v(-1.0, 1.0, -1.0),
    v(-1.0, 1.0, 1.0),
    v(-1.0, -1.0, 1.0),
    v(1.0, -1.0, 1.0),
    v(1.0, -1.0, -1.0),
    v(1.0, -1.0, -1.0),
    v(-1.0, -1.0, -1.0),
    v(-1.0, -1.0, 1.0),
    v(-1.0, 1.0, -1.0),
    v(1.0, 1.0, -1.0),
    v(1.0, 1.0, 1.0),
    v(1.0, 1.0, 1.0),
    v(-1.0, 1.0, 1.0),
    v(-1.0, 1.0, -1.0),
];

/// Camera and cube placement plus the per-frame clock value, with the fixed
/// projection parameters. Everything the matrices are derived from lives
/// here rather than in globals.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub camera_pos: Vec3,
    pub cube_pos: Vec3,
    pub time_factor: f32,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl RenderState {
    /// Initial placement: camera a fixed distance back from the origin,
    /// cube slightly below it.
    pub fn new(settings: &Settings) -> Self {
        Self {
            camera_pos: vec3(0.0, 0.0, 600.0),
            cube_pos: vec3(0.0, -2.0, 0.0),
            time_factor: 0.0,
            fov_y: settings.fov_y_radians,
            z_near: settings.z_near,
            z_far: settings.z_far,
        }
    }

    /// Overwrites the time factor from the external clock. The raw value is
    /// passed through to the shader untransformed.
    pub fn set_time(&mut self, seconds: f64) {
        self.time_factor = seconds as f32;
    }

    /// Perspective projection from the framebuffer size at the moment of
    /// the call.
    pub fn projection_matrix(&self, framebuffer_size: (u32, u32)) -> Mat4 {
        let (width, height) = framebuffer_size;
        let aspect = width as f32 / height as f32;
        Mat4::perspective_rh_gl(self.fov_y, aspect, self.z_near, self.z_far)
    }

    /// View matrix: translation by the negated camera position.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.camera_pos)
    }

    /// Model matrix: translation by the cube position.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.cube_pos)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

/// The scene owns the compiled shader program, the GPU-resident cube mesh
/// and the [`RenderState`] the per-frame matrices are derived from.
pub struct Scene {
    program: ShaderProgram,
    mesh: Mesh,
    pub state: RenderState,
    instance_count: i32,
}

impl Scene {
    /// One-time setup: compiles and links the two shader files, uploads the
    /// cube vertices and places the camera and the cube.
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self, InitError> {
        let program = load_program(gl, &settings.vert_shader, &settings.frag_shader)?;
        let mesh = Mesh::new(gl, &CUBE_VERTICES, glow::TRIANGLES);
        log::info!(
            "uploaded cube mesh ({} vertices), drawing {} instances per frame",
            mesh.vertex_count(),
            settings.instance_count
        );

        Ok(Self {
            program,
            mesh,
            state: RenderState::new(settings),
            instance_count: settings.instance_count,
        })
    }

    /// Renders one frame. `elapsed` is the wall-clock time in seconds since
    /// the loop started; it is the only varying input.
    pub fn render(&mut self, gl: &glow::Context, framebuffer_size: (u32, u32), elapsed: f64) {
        self.state.set_time(elapsed);

        unsafe {
            gl.clear(glow::DEPTH_BUFFER_BIT);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }

        self.program.use_program();

        let projection = self.state.projection_matrix(framebuffer_size);
        let view = self.state.view_matrix();
        let model = self.state.model_matrix();

        self.program.set_uniform("proj_matrix", projection);
        self.program.set_uniform("v_matrix", view);
        self.program.set_uniform("m_matrix", model);
        self.program.set_uniform("tf", self.state.time_factor);

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
        }

        self.mesh.draw_instanced(self.instance_count);
    }
}

fn load_program(
    gl: &Arc<glow::Context>,
    vert_path: &Path,
    frag_path: &Path,
) -> Result<ShaderProgram, InitError> {
    let vert_src = read_shader_source(vert_path)?;
    let frag_src = read_shader_source(frag_path)?;
    let vert =
        Shader::new(gl, glow::VERTEX_SHADER, &vert_src).map_err(InitError::ShaderCompile)?;
    let frag =
        Shader::new(gl, glow::FRAGMENT_SHADER, &frag_src).map_err(InitError::ShaderCompile)?;
    ShaderProgram::new(gl, &[&vert, &frag]).map_err(InitError::ShaderLink)
}

fn read_shader_source(path: &Path) -> Result<String, InitError> {
    std::fs::read_to_string(path).map_err(|source| InitError::ShaderRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_36_position_only_vertices() {
        assert_eq!(CUBE_VERTICES.len(), 36);
        assert_eq!(std::mem::size_of::<CubeVertex>(), 3 * 4);
        assert_eq!(std::mem::size_of_val(&CUBE_VERTICES), 108 * 4);
    }

    #[test]
    fn test_cube_is_2x2x2_centered_at_origin() {
        for vertex in &CUBE_VERTICES {
            for coord in vertex.position {
                assert!(coord == 1.0 || coord == -1.0);
            }
        }
        // each axis has as many vertices on one face as on the other
        for axis in 0..3 {
            let positive = CUBE_VERTICES
                .iter()
                .filter(|v| v.position[axis] == 1.0)
                .count();
            assert_eq!(positive, 18);
        }
    }

    #[test]
    fn test_default_placement() {
        let state = RenderState::default();
        assert_eq!(state.camera_pos, vec3(0.0, 0.0, 600.0));
        assert_eq!(state.cube_pos, vec3(0.0, -2.0, 0.0));
        assert_eq!(state.time_factor, 0.0);
    }

    #[test]
    fn test_time_is_passed_through_untouched() {
        let mut state = RenderState::default();
        state.set_time(0.0);
        assert_eq!(state.time_factor, 0.0);
        state.set_time(12.5);
        assert_eq!(state.time_factor, 12.5);
    }

    #[test]
    fn test_projection_uses_fixed_fov_and_planes() {
        let state = RenderState::default();
        let expected = Mat4::perspective_rh_gl(1.0472, 1200.0 / 800.0, 0.1, 1000.0);
        assert_eq!(state.projection_matrix((1200, 800)), expected);

        // the time factor has no influence on the projection
        let mut later = state.clone();
        later.set_time(12.5);
        assert_eq!(later.projection_matrix((1200, 800)), expected);
    }

    #[test]
    fn test_projection_tracks_framebuffer_size() {
        let state = RenderState::default();
        let wide = state.projection_matrix((1200, 800));
        let square = state.projection_matrix((800, 800));
        assert_ne!(wide, square);
        assert_eq!(
            square,
            Mat4::perspective_rh_gl(1.0472, 1.0, 0.1, 1000.0)
        );
        // a resize leaves view and model untouched
        assert_eq!(state.view_matrix(), RenderState::default().view_matrix());
        assert_eq!(state.model_matrix(), RenderState::default().model_matrix());
    }

    #[test]
    fn test_view_matrix_negates_camera_position() {
        let state = RenderState::default();
        assert_eq!(
            state.view_matrix(),
            Mat4::from_translation(vec3(0.0, 0.0, -600.0))
        );

        let mut moved = state.clone();
        moved.camera_pos = vec3(5.0, -3.0, 10.0);
        assert_eq!(
            moved.view_matrix(),
            Mat4::from_translation(vec3(-5.0, 3.0, -10.0))
        );
    }

    #[test]
    fn test_model_matrix_translates_to_cube_position() {
        let state = RenderState::default();
        assert_eq!(
            state.model_matrix(),
            Mat4::from_translation(vec3(0.0, -2.0, 0.0))
        );
    }
}
