//! Tower Ball entry point
//!
//! Loads the config, then runs the game loop headless: key events come in
//! as lines on stdin (`left`, `right`, `up`, `down`, `space`, `esc`, `quit`)
//! and each frame's draw intent is logged.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use tower_ball::config::{Loaded, RawConfig};
use tower_ball::game::{GameLoop, RenderSink};
use tower_ball::render::{DrawShape, Frame, Role};
use tower_ball::sim::{InputEvent, Key};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fixed-timestep ball, walls and tower demo", long_about = None)]
struct Args {
    /// Config file; written with defaults if missing
    #[arg(long, default_value = "tower-ball.json")]
    config: PathBuf,
    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,
}

/// Logs the ball pose once per `every` frames, everything at trace level
struct LogSink {
    every: u64,
}

impl RenderSink for LogSink {
    fn present(&mut self, frame: &Frame) {
        for command in &frame.commands {
            log::trace!("tick {}: {:?}", frame.tick, command);
        }
        if frame.tick % self.every != 0 {
            return;
        }
        let ball = frame.commands.iter().find(|c| c.role == Role::Ball);
        if let Some(DrawShape::Circle { center, angle, .. }) = ball.map(|c| c.shape) {
            log::info!(
                "tick {}: ball at ({:.1}, {:.1}), angle {:.2}, {} shapes",
                frame.tick,
                center.x,
                center.y,
                angle,
                frame.commands.len()
            );
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        log::debug!("Render sink released");
    }
}

fn parse_line(line: &str) -> Option<InputEvent> {
    match line.trim() {
        "" => None,
        "quit" | "exit" => Some(InputEvent::Quit),
        key => Some(InputEvent::KeyDown(Key::from_name(key))),
    }
}

/// Forward lines as input events until end of input, then ask the loop to quit
fn forward_lines(reader: impl BufRead, tx: &mpsc::Sender<InputEvent>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if let Some(event) = parse_line(&line) {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
    log::debug!("Input closed, requesting quit");
    let _ = tx.send(InputEvent::Quit);
}

fn spawn_stdin_reader(tx: mpsc::Sender<InputEvent>) {
    thread::spawn(move || forward_lines(io::stdin().lock(), &tx));
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Tower Ball starting...");

    let config = match RawConfig::load_or_create(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?
    {
        Loaded::Existing(config) => config,
        Loaded::Created(path) => {
            println!("Generated {}; review it and run again", path.display());
            return Ok(());
        }
    };

    let (tx, mut rx) = mpsc::channel();
    spawn_stdin_reader(tx);

    let mut game = GameLoop::new(&config)
        .context("building arena")?
        .with_max_frames(args.max_frames);
    let mut sink = LogSink {
        every: u64::from(config.fps()),
    };

    let summary = game.run(&mut rx, &mut sink).context("game loop failed")?;
    drop(sink);
    log::info!(
        "Exiting after {} frames ({} ticks, quit requested: {})",
        summary.frames,
        summary.ticks,
        summary.quit_requested
    );
    Ok(())
}
