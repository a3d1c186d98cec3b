use std::path::Path;
use std::time::Instant;

use glow::HasContext;

use crate::abs::*;
use crate::scene::Scene;
use crate::settings::Settings;

mod abs;
mod scene;
mod settings;

const SETTINGS_PATH: &str = "settings.json";

fn setup_logger() -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()
}

fn main() -> std::process::ExitCode {
    if let Err(e) = setup_logger() {
        eprintln!("Failed to set up logging: {}", e);
    }

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), InitError> {
    let settings = Settings::load(Path::new(SETTINGS_PATH))?;
    let mut app = App::new(&settings.title, settings.width, settings.height)?;
    let mut scene = Scene::new(&app.gl, &settings)?;

    let start = Instant::now();
    let mut frames = 0u32;
    let mut sample = Instant::now();

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => unsafe {
                    app.gl.viewport(0, 0, width, height);
                },
                _ => {}
            }
        }

        scene.render(
            &app.gl,
            app.window.drawable_size(),
            start.elapsed().as_secs_f64(),
        );
        app.window.gl_swap_window();

        frames += 1;
        if sample.elapsed().as_secs_f32() >= 0.5 {
            log::trace!("{:.1} fps", frames as f32 / sample.elapsed().as_secs_f32());
            frames = 0;
            sample = Instant::now();
        }
    }

    Ok(())
}
