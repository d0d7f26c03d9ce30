/// Example: Render a few frames off-screen and print the last one as text
///
/// Usage: cargo run --example snapshot -- [seconds] [cols] [rows]

use orbscape_core::{
    FrameLoop, FrameScheduler, HostEvent, ManualClock, Result, Scene, SceneConfig,
};
use orbscape_terminal::{terminal_viewport, AsciiRenderer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;

/// Steps a manual clock at 30 fps and stops once `end` is reached
struct FixedStep<'a> {
    clock: &'a ManualClock,
    end: f32,
    token: orbscape_core::CancellationToken,
}

impl FrameScheduler for FixedStep<'_> {
    fn next_frame(&mut self) -> Result<Vec<HostEvent>> {
        self.clock.advance(1.0 / 30.0);
        if orbscape_core::Clock::elapsed_secs(self.clock) >= self.end {
            self.token.cancel();
        }
        Ok(Vec::new())
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let seconds: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(2.0);
    let cols: u16 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(80);
    let rows: u16 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(24);

    let viewport = terminal_viewport(cols, rows);
    let scene = Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(1));
    let clock = ManualClock::new();

    let mut frame_loop = FrameLoop::new(scene, viewport, &clock);
    let mut scheduler = FixedStep {
        clock: &clock,
        end: seconds,
        token: frame_loop.cancellation_token(),
    };
    let mut renderer = AsciiRenderer::for_viewport(&viewport);

    let frames = frame_loop.run(&mut scheduler, &mut renderer)?;

    println!("{}", renderer.to_text());
    println!("-- {} frames, t = {:.2}s", frames, seconds);
    Ok(())
}
