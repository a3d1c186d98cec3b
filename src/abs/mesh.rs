//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing vertex data on the
//! GPU side. Vertices should implement the [`Vertex`] trait. Meshes here are
//! non-indexed and drawn instanced; the vertex data is uploaded exactly once
//! at creation and never touched again.

use std::sync::Arc;

use glow::HasContext;

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

/// Represents a static mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: usize,
}

impl Mesh {
    /// Creates a new mesh from the given vertex data. The upload happens
    /// here and only here; there is no update path.
    pub fn new<V: Vertex>(gl: &Arc<glow::Context>, vertices: &[V], draw_mode: u32) -> Self {
        unsafe {
            let vao = gl.create_vertex_array().unwrap();
            let vbo = gl.create_buffer().unwrap();

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    vertices.len() * std::mem::size_of::<V>(),
                ),
                glow::STATIC_DRAW,
            );

            V::vertex_attribs(gl);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo,
                vertex_count: vertices.len(),
            }
        }
    }

    /// Draws the mesh `instances` times in a single call.
    pub fn draw_instanced(&self, instances: i32) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_arrays_instanced(self.draw_mode, 0, self.vertex_count as i32, instances);
            self.gl.bind_vertex_array(None);
        }
    }

    // Returns the amount of vertices stored in the mesh
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
