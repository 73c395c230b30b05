use std::time::Instant;

use crate::config::Config;
use crate::engine::{
    MovementConfig, MovementEngine, RandomTargetPicker, ShotResult, Snapshot, TargetPicker,
};
use crate::input::{self, Command};
use crate::runtime::StrafeEvent;

/// What the caller should do after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// State changed; draw a new frame
    Redraw,
    /// Nothing visible changed
    Idle,
    Quit,
}

/// A single training session
#[derive(Debug)]
pub struct App<P: TargetPicker = RandomTargetPicker> {
    pub config: Config,
    pub engine: MovementEngine<P>,
    pub shots: u32,
    pub last_shot: Option<ShotResult>,
    /// Timestamp of the most recently applied event
    pub clock: Instant,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_picker(config, RandomTargetPicker)
    }
}

impl<P: TargetPicker> App<P> {
    pub fn with_picker(config: Config, picker: P) -> Self {
        let engine = MovementEngine::with_picker(MovementConfig::from(&config), picker);
        Self {
            config,
            engine,
            shots: 0,
            last_shot: None,
            clock: Instant::now(),
        }
    }

    pub fn apply(&mut self, command: Command, now: Instant) -> Flow {
        self.clock = now;
        match command {
            Command::Move(key) => {
                self.engine.on_key_down(key, now);
                Flow::Redraw
            }
            Command::Shoot => {
                self.shots += 1;
                self.last_shot = Some(self.engine.on_shoot(now));
                Flow::Redraw
            }
            Command::Quit => Flow::Quit,
        }
    }

    /// Feed one runtime event, stamped with `now`
    pub fn handle_event(&mut self, event: &StrafeEvent, now: Instant) -> Flow {
        match event {
            StrafeEvent::Tick => {
                self.clock = now;
                self.engine.advance_tick(now);
                Flow::Redraw
            }
            StrafeEvent::Resize => Flow::Redraw,
            other => match input::command_for(other) {
                Some(command) => self.apply(command, now),
                None => Flow::Idle,
            },
        }
    }

    pub fn score(&self) -> u32 {
        self.engine.state().score
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot(self.clock)
    }
}
