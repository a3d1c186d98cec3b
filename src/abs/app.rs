//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application,
//! and the [`InitError`] type covering everything that can go wrong
//! before the render loop starts.

use std::path::PathBuf;
use std::sync::Arc;

/// A fatal setup error. Nothing in here is recoverable; the entry point
/// logs the error and exits with a failure code.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to initialize SDL: {0}")]
    SdlInit(String),
    #[error("failed to create window: {0}")]
    Window(#[from] sdl2::video::WindowBuildError),
    #[error("failed to create OpenGL context: {0}")]
    GlContext(String),
    #[error("failed to read shader source {path}: {source}")]
    ShaderRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),
    #[error("shader program linking failed: {0}")]
    ShaderLink(String),
    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] instance with the specified title, width, and
    /// height. Requests an OpenGL 4.3 core profile context and enables
    /// v-sync on it.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, InitError> {
        let sdl = sdl2::init().map_err(InitError::SdlInit)?;
        let video_subsystem = sdl.video().map_err(InitError::SdlInit)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(4, 3);
        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()?;
        let gl_context = window.gl_create_context().map_err(InitError::GlContext)?;
        window
            .gl_make_current(&gl_context)
            .map_err(InitError::GlContext)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        video_subsystem
            .gl_set_swap_interval(sdl2::video::SwapInterval::VSync)
            .map_err(InitError::GlContext)?;
        let event_pump = sdl.event_pump().map_err(InitError::SdlInit)?;
        let gl = Arc::new(gl);

        log::info!("created {}x{} window with OpenGL 4.3 core context", width, height);

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }
}
