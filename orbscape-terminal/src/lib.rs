/// Terminal host for the orbscape scene
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::info;
use orbscape_core::{
    Camera, FrameLoop, FrameSink, MonotonicClock, Result, Scene, Viewport,
};
use std::io::{stdout, Write};
use std::time::Instant;

pub mod cli;
pub mod renderer;
pub mod scheduler;

pub use renderer::AsciiRenderer;
pub use scheduler::TerminalScheduler;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: u32 = 2;

/// Viewport for a terminal of `cols x rows` cells, in square units
pub fn terminal_viewport(cols: u16, rows: u16) -> Viewport {
    Viewport::new(cols as u32, rows as u32 * CELL_ASPECT)
}

/// Frames-per-second meter, refreshed once a second
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rasterizes each frame and writes it, with a status line, to `out`
pub struct TerminalSurface<W: Write> {
    renderer: AsciiRenderer,
    out: W,
    fps: FpsCounter,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(viewport: &Viewport, out: W) -> Self {
        Self {
            renderer: AsciiRenderer::for_viewport(viewport),
            out,
            fps: FpsCounter::new(),
        }
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }
}

impl<W: Write> FrameSink for TerminalSurface<W> {
    fn render(&mut self, scene: &Scene, camera: &Camera, viewport: &Viewport) -> Result<()> {
        self.renderer.render(scene, camera, viewport)?;
        self.fps.tick();

        self.renderer.draw(&mut self.out)?;

        // Draw UI overlay
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(TermColor::Yellow),
            Print(format!(
                "Orbscape | FPS: {:.1} | Move the mouse to tilt the scene, Q to quit",
                self.fps.fps()
            )),
            ResetColor
        )?;

        self.out.flush()?;
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) -> Result<()> {
        self.renderer.resize(viewport)?;
        queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }
}

/// Runtime options for the terminal host
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub target_fps: u32,
    pub max_frames: Option<u64>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            target_fps: 30,
            max_frames: None,
        }
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    frame_loop: FrameLoop<MonotonicClock>,
    options: AppOptions,
}

impl TerminalApp {
    pub fn new(scene: Scene, options: AppOptions) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        let viewport = terminal_viewport(cols, rows);

        Ok(Self {
            frame_loop: FrameLoop::new(scene, viewport, MonotonicClock::new()),
            options,
        })
    }

    /// Run until the user quits or the frame limit is hit. Returns frames rendered.
    pub fn run(&mut self) -> Result<u64> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        let restored = restore_terminal(&mut stdout());
        finish(result, restored)
    }

    fn main_loop(&mut self) -> Result<u64> {
        let mut scheduler = TerminalScheduler::new(
            self.options.target_fps,
            self.frame_loop.cancellation_token(),
        )
        .with_max_frames(self.options.max_frames);
        let mut surface = TerminalSurface::new(self.frame_loop.viewport(), stdout().lock());

        info!("Starting terminal host at {} fps", self.options.target_fps);
        self.frame_loop.run(&mut scheduler, &mut surface)
    }
}

fn restore_terminal<W: Write>(out: &mut W) -> Result<()> {
    let screen = execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    let raw = terminal::disable_raw_mode();
    screen?;
    raw?;
    Ok(())
}

/// The loop's outcome wins over a cleanup failure
fn finish(result: Result<u64>, restored: Result<()>) -> Result<u64> {
    let frames = result?;
    restored?;
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbscape_core::{Error, SceneConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_terminal_viewport_doubles_rows() {
        let viewport = terminal_viewport(120, 40);
        assert_eq!((viewport.width, viewport.height), (120, 80));
        assert!((viewport.aspect() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_surface_writes_frame_and_overlay() {
        let viewport = terminal_viewport(60, 20);
        let scene = Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(8));
        let camera = Camera::scene_default(&viewport);
        let mut surface = TerminalSurface::new(&viewport, Vec::new());

        surface.render(&scene, &camera, &viewport).unwrap();

        let written = String::from_utf8_lossy(&surface.out);
        assert!(written.contains("Orbscape | FPS"));
        assert!(surface.renderer().filled_cells() > 0);
    }

    #[test]
    fn test_surface_resize_follows_viewport() {
        let mut surface = TerminalSurface::new(&terminal_viewport(10, 10), Vec::new());
        surface.resize(&terminal_viewport(90, 25)).unwrap();
        assert_eq!(surface.renderer().size(), (90, 25));
    }

    #[test]
    fn test_loop_error_reported_before_cleanup_error() {
        let failed = finish(
            Err(Error::Render("frame".to_string())),
            Err(Error::Surface("restore".to_string())),
        );
        assert!(matches!(failed, Err(Error::Render(_))));

        let cleanup = finish(Ok(12), Err(Error::Surface("restore".to_string())));
        assert!(matches!(cleanup, Err(Error::Surface(_))));

        assert_eq!(finish(Ok(12), Ok(())).unwrap(), 12);
    }
}
