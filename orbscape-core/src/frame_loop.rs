/// Frame-driven run loop
///
/// The host supplies display refreshes (`FrameScheduler`) and a renderer
/// (`FrameSink`); the loop owns the scene and everything a frame reads.
use log::{error, info, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::animation::FrameInput;
use crate::clock::Clock;
use crate::error::Result;
use crate::pointer::PointerState;
use crate::projection::Camera;
use crate::scene::Scene;
use crate::viewport::Viewport;

/// Shared stop flag; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Outcome of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stopped,
}

/// Input delivered by the host between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Absolute pointer position in viewport units
    PointerMoved { client_x: f32, client_y: f32 },
    Resized(Viewport),
}

/// The render collaborator
pub trait FrameSink {
    fn render(&mut self, scene: &Scene, camera: &Camera, viewport: &Viewport) -> Result<()>;

    /// Called as soon as the host reports a new surface size
    fn resize(&mut self, _viewport: &Viewport) -> Result<()> {
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn render(&mut self, scene: &Scene, camera: &Camera, viewport: &Viewport) -> Result<()> {
        (**self).render(scene, camera, viewport)
    }

    fn resize(&mut self, viewport: &Viewport) -> Result<()> {
        (**self).resize(viewport)
    }
}

/// Source of display refreshes
pub trait FrameScheduler {
    /// Wait for the next refresh and return the host events delivered since
    /// the previous one, oldest first.
    fn next_frame(&mut self) -> Result<Vec<HostEvent>>;
}

pub struct FrameLoop<C: Clock> {
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    pointer: PointerState,
    clock: C,
    state: LoopState,
    frames: u64,
    token: CancellationToken,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(scene: Scene, viewport: Viewport, clock: C) -> Self {
        Self {
            scene,
            camera: Camera::scene_default(&viewport),
            viewport,
            pointer: PointerState::centered(),
            clock,
            state: LoopState::Idle,
            frames: 0,
            token: CancellationToken::new(),
        }
    }

    /// A handle that stops the loop at the start of its next frame
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Apply a host event. Resizes take effect on the camera immediately.
    pub fn handle_event<S: FrameSink>(&mut self, event: HostEvent, sink: &mut S) -> Result<()> {
        match event {
            HostEvent::PointerMoved { client_x, client_y } => {
                self.pointer = PointerState::from_client(client_x, client_y, &self.viewport);
            }
            HostEvent::Resized(viewport) => {
                info!(
                    "Viewport resized to {}x{} (pixel ratio {})",
                    viewport.width,
                    viewport.height,
                    viewport.pixel_ratio()
                );
                self.viewport = viewport;
                self.camera.resize(&viewport);
                sink.resize(&viewport)?;
            }
        }
        Ok(())
    }

    /// The inputs the next frame would see
    pub fn sample_input(&self) -> FrameInput {
        FrameInput::new(self.clock.elapsed_secs(), self.pointer)
    }

    /// Run one frame: sample time and pointer, update the scene, render.
    pub fn frame<S: FrameSink>(&mut self, sink: &mut S) -> Result<FrameStatus> {
        if self.token.is_cancelled() {
            if self.state != LoopState::Stopped {
                info!("Frame loop stopped after {} frames", self.frames);
                self.state = LoopState::Stopped;
            }
            return Ok(FrameStatus::Stopped);
        }

        if self.state == LoopState::Idle {
            info!("Frame loop started");
            self.state = LoopState::Running;
        }

        let input = self.sample_input();
        let pose = self.scene.update(&input);
        trace!("Frame {} at t={:.3}: {:?}", self.frames, input.elapsed, pose);

        if let Err(e) = sink.render(&self.scene, &self.camera, &self.viewport) {
            error!("Render failed on frame {}: {}", self.frames, e);
            self.state = LoopState::Stopped;
            self.token.cancel();
            return Err(e);
        }

        self.frames += 1;
        Ok(FrameStatus::Continue)
    }

    /// Drive frames until cancelled. Returns the number of frames rendered.
    pub fn run<F: FrameScheduler, S: FrameSink>(
        &mut self,
        scheduler: &mut F,
        sink: &mut S,
    ) -> Result<u64> {
        while self.frame(sink)? == FrameStatus::Continue {
            for event in scheduler.next_frame()? {
                self.handle_event(event, sink)?;
            }
        }
        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use crate::scene::SceneConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct RecordingSink {
        orb_yaws: Vec<f32>,
        aspects: Vec<f32>,
        resizes: Vec<Viewport>,
    }

    impl FrameSink for RecordingSink {
        fn render(&mut self, scene: &Scene, camera: &Camera, _viewport: &Viewport) -> Result<()> {
            self.orb_yaws.push(scene.orb.transform.rotation.y);
            self.aspects.push(camera.aspect);
            Ok(())
        }

        fn resize(&mut self, viewport: &Viewport) -> Result<()> {
            self.resizes.push(*viewport);
            Ok(())
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn render(&mut self, _: &Scene, _: &Camera, _: &Viewport) -> Result<()> {
            Err(Error::Render("context lost".to_string()))
        }
    }

    fn frame_loop(clock: &ManualClock) -> FrameLoop<&ManualClock> {
        let scene = Scene::compose(&SceneConfig::default(), &mut StdRng::seed_from_u64(1));
        FrameLoop::new(scene, Viewport::new(800, 600), clock)
    }

    #[test]
    fn test_state_transitions() {
        let clock = ManualClock::new();
        let mut frame_loop = frame_loop(&clock);
        let mut sink = RecordingSink::default();
        assert_eq!(frame_loop.state(), LoopState::Idle);

        assert_eq!(frame_loop.frame(&mut sink).unwrap(), FrameStatus::Continue);
        assert_eq!(frame_loop.state(), LoopState::Running);

        frame_loop.cancellation_token().cancel();
        assert_eq!(frame_loop.frame(&mut sink).unwrap(), FrameStatus::Stopped);
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert_eq!(frame_loop.frames_rendered(), 1);
    }

    #[test]
    fn test_frame_samples_clock_and_pointer() {
        let clock = ManualClock::starting_at(2.0);
        let mut frame_loop = frame_loop(&clock);
        let mut sink = RecordingSink::default();

        frame_loop
            .handle_event(HostEvent::PointerMoved { client_x: 800.0, client_y: 300.0 }, &mut sink)
            .unwrap();
        assert_eq!(frame_loop.pointer(), PointerState::new(1.0, 0.0));

        frame_loop.frame(&mut sink).unwrap();
        assert_eq!(sink.orb_yaws, vec![0.4 * 2.0 + 0.4 * 1.0]);
    }

    #[test]
    fn test_resize_updates_aspect_before_next_frame() {
        let clock = ManualClock::new();
        let mut frame_loop = frame_loop(&clock);
        let mut sink = RecordingSink::default();

        frame_loop.frame(&mut sink).unwrap();
        frame_loop
            .handle_event(HostEvent::Resized(Viewport::new(1000, 250)), &mut sink)
            .unwrap();
        frame_loop.frame(&mut sink).unwrap();

        assert!((sink.aspects[0] - 800.0 / 600.0).abs() < 1e-6);
        assert!((sink.aspects[1] - 4.0).abs() < 1e-6);
        assert_eq!(sink.resizes, vec![Viewport::new(1000, 250)]);
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let clock = ManualClock::new();
        let mut frame_loop = frame_loop(&clock);

        assert!(frame_loop.frame(&mut FailingSink).is_err());
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert_eq!(frame_loop.frames_rendered(), 0);

        // A failed loop does not resume
        let mut sink = RecordingSink::default();
        assert_eq!(frame_loop.frame(&mut sink).unwrap(), FrameStatus::Stopped);
        assert!(sink.orb_yaws.is_empty());
    }
}
