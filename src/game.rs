//! Frame-synchronous game loop
//!
//! One thread owns the arena. Each frame, in this order:
//! 1. drain pending input and apply it to the world
//! 2. hand the current draw list to the render sink
//! 3. block on the frame pacer until `1 / fps` has elapsed
//! 4. step the world by the fixed `dt`
//!
//! Physics never sees wall-clock time; the pacer only sets the cadence.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Result;
use crate::render::{self, Frame, Palette};
use crate::sim::{Arena, Flow, InputEvent, apply_input};

/// Host event source, drained once per frame
pub trait InputSource {
    /// Every event received since the last call, oldest first
    fn drain(&mut self) -> Vec<InputEvent>;
}

/// Consumer of per-frame draw intent
pub trait RenderSink {
    fn present(&mut self, frame: &Frame);
}

/// Events arriving on a channel from another producer
impl InputSource for Receiver<InputEvent> {
    fn drain(&mut self) -> Vec<InputEvent> {
        self.try_iter().collect()
    }
}

/// Pre-recorded input: one batch of events per frame, then silence
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn drain(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Blocks until a fixed interval has passed since the previous frame began
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    frame_start: Option<Instant>,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
            frame_start: None,
        }
    }

    /// A pacer that never sleeps (headless runs and tests)
    pub fn unpaced() -> Self {
        Self {
            interval: Duration::ZERO,
            frame_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep out the rest of the current frame, then start the next one
    pub fn wait(&mut self) {
        if let Some(start) = self.frame_start {
            let elapsed = start.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.frame_start = Some(Instant::now());
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub ticks: u64,
    /// True when the loop ended on a quit request rather than a frame cap
    pub quit_requested: bool,
}

/// Top-level driver owning the arena
#[derive(Debug)]
pub struct GameLoop {
    arena: Arena,
    palette: Palette,
    pacer: FramePacer,
    max_frames: Option<u64>,
    frames: u64,
}

impl GameLoop {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            arena: Arena::new(config)?,
            palette: Palette::default(),
            pacer: FramePacer::new(config.fps()),
            max_frames: None,
            frames: 0,
        })
    }

    pub fn with_pacer(mut self, pacer: FramePacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Stop after `frames` frames even without a quit request
    pub fn with_max_frames(mut self, frames: Option<u64>) -> Self {
        self.max_frames = frames;
        self
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. Returns `Flow::Exit` without drawing or stepping when
    /// the input asked to quit.
    pub fn frame<I, R>(&mut self, input: &mut I, sink: &mut R) -> Result<Flow>
    where
        I: InputSource + ?Sized,
        R: RenderSink + ?Sized,
    {
        let events = input.drain();
        if apply_input(&mut self.arena, &events)? == Flow::Exit {
            return Ok(Flow::Exit);
        }

        sink.present(&render::extract(&self.arena, &self.palette));
        self.pacer.wait();
        self.arena.step();
        self.frames += 1;
        Ok(Flow::Continue)
    }

    /// Run frames until a quit request or the frame cap
    pub fn run<I, R>(&mut self, input: &mut I, sink: &mut R) -> Result<RunSummary>
    where
        I: InputSource + ?Sized,
        R: RenderSink + ?Sized,
    {
        log::info!(
            "Game loop running at {} Hz (frame interval {:?})",
            (1.0 / self.arena.world().fixed_dt()).round(),
            self.pacer.interval()
        );
        let started = Instant::now();

        let mut quit_requested = false;
        loop {
            if self.max_frames.is_some_and(|max| self.frames >= max) {
                log::info!("Frame cap of {} reached", self.frames);
                break;
            }
            if self.frame(input, sink)? == Flow::Exit {
                quit_requested = true;
                break;
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            log::info!(
                "Game loop stopped after {} frames ({:.1} fps measured)",
                self.frames,
                self.frames as f64 / elapsed
            );
        }

        Ok(RunSummary {
            frames: self.frames,
            ticks: self.arena.time_ticks(),
            quit_requested,
        })
    }
}
