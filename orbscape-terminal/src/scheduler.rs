/// Frame pacing and input translation for the terminal host
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use log::debug;
use orbscape_core::{CancellationToken, FrameScheduler, HostEvent, Result};
use std::time::{Duration, Instant};

use crate::terminal_viewport;
use crate::CELL_ASPECT;

/// Waits out the frame budget while collecting terminal events
pub struct TerminalScheduler {
    frame_time: Duration,
    last_frame: Instant,
    token: CancellationToken,
    max_frames: Option<u64>,
    frames: u64,
}

impl TerminalScheduler {
    pub fn new(target_fps: u32, token: CancellationToken) -> Self {
        Self {
            frame_time: Duration::from_millis(1000 / target_fps.max(1) as u64),
            last_frame: Instant::now(),
            token,
            max_frames: None,
            frames: 0,
        }
    }

    /// Cancel the loop once this many frames have been rendered
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Record a rendered frame. Cancels the token and returns true at the limit.
    fn count_frame(&mut self) -> bool {
        self.frames += 1;
        let done = self.max_frames.is_some_and(|max| self.frames >= max);
        if done {
            debug!("Frame limit of {} reached", self.frames);
            self.token.cancel();
        }
        done
    }
}

impl FrameScheduler for TerminalScheduler {
    fn next_frame(&mut self) -> Result<Vec<HostEvent>> {
        if self.count_frame() {
            return Ok(Vec::new());
        }

        let deadline = self.last_frame + self.frame_time;
        let mut events = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                break;
            }
            if let Some(event) = translate_event(event::read()?, &self.token) {
                events.push(event);
            }
        }

        self.last_frame = Instant::now();
        Ok(events)
    }
}

/// Map a crossterm event onto a host event. Quit keys cancel `token` instead.
pub fn translate_event(event: Event, token: &CancellationToken) -> Option<HostEvent> {
    match event {
        Event::Key(KeyEvent {
            code, modifiers, ..
        }) => {
            let quit = matches!(code, KeyCode::Char('q') | KeyCode::Esc)
                || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL));
            if quit {
                token.cancel();
            }
            None
        }
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
            column,
            row,
            ..
        }) => Some(HostEvent::PointerMoved {
            // Sample the cell centre
            client_x: column as f32 + 0.5,
            client_y: (row as f32 + 0.5) * CELL_ASPECT as f32,
        }),
        Event::Resize(cols, rows) => Some(HostEvent::Resized(terminal_viewport(cols, rows))),
        _ => None,
    }
}
