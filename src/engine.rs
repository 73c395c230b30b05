use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;

/// Speeds at or below this snap to rest while decelerating.
const REST_SNAP: f64 = 0.1;

/// Width of the target zone in cells
pub const TARGET_WIDTH: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Key {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotResult {
    Hit,
    Miss,
}

/// Immutable tuning for a [`MovementEngine`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementConfig {
    /// Playable column count, borders included
    pub field_width: u16,
    pub acceleration: f64,
    /// Multiplier applied to velocity on each tick with no (or both) keys held
    pub deceleration: f64,
    pub max_velocity: f64,
    /// Speeds strictly below this count as stopped
    pub standstill_threshold: f64,
    pub release_timeout: Duration,
    pub counter_strafe_window: Duration,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for MovementConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            field_width: cfg.field_width,
            acceleration: cfg.acceleration_rate,
            deceleration: cfg.deceleration_factor,
            max_velocity: cfg.max_velocity,
            standstill_threshold: cfg.standstill_threshold,
            release_timeout: Duration::from_millis(cfg.release_timeout_ms),
            counter_strafe_window: Duration::from_millis(cfg.counter_strafe_window_ms),
        }
    }
}

impl MovementConfig {
    pub fn min_position(&self) -> f64 {
        1.0
    }

    pub fn max_position(&self) -> f64 {
        f64::from(self.field_width) - 2.0
    }

    /// Valid left edges for the target so the whole zone fits inside the border
    pub fn target_range(&self) -> RangeInclusive<i32> {
        2..=i32::from(self.field_width) - 3
    }
}

/// Source of target placements, injected so tests can script them.
pub trait TargetPicker {
    /// Returns a value within `range`.
    fn pick(&mut self, range: RangeInclusive<i32>) -> i32;
}

/// Uniform placement from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTargetPicker;

impl TargetPicker for RandomTargetPicker {
    fn pick(&mut self, range: RangeInclusive<i32>) -> i32 {
        if range.is_empty() {
            return *range.start();
        }
        rand::thread_rng().gen_range(range)
    }
}

/// Replays a fixed list of placements, clamped into range. Falls back to the
/// range start once the list is used up.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTargetPicker {
    queue: std::collections::VecDeque<i32>,
}

impl ScriptedTargetPicker {
    pub fn new<I: IntoIterator<Item = i32>>(placements: I) -> Self {
        Self {
            queue: placements.into_iter().collect(),
        }
    }
}

impl TargetPicker for ScriptedTargetPicker {
    fn pick(&mut self, range: RangeInclusive<i32>) -> i32 {
        let (lo, hi) = (*range.start(), *range.end());
        match self.queue.pop_front() {
            Some(v) => v.clamp(lo, hi.max(lo)),
            None => lo,
        }
    }
}

/// A key hold inferred from press events alone. Every press renews the
/// lease; [`MovementEngine::advance_tick`] revokes it once it goes stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyLease {
    held: bool,
    last_press: Option<Instant>,
}

impl KeyLease {
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn last_press(&self) -> Option<Instant> {
        self.last_press
    }

    /// Records a press. Returns true only on a Released -> Pressed transition.
    fn renew(&mut self, now: Instant) -> bool {
        self.last_press = Some(now);
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    /// Releases the key if no press arrived within `timeout`.
    fn expire(&mut self, now: Instant, timeout: Duration) -> bool {
        let stale = self
            .last_press
            .is_some_and(|t| now.saturating_duration_since(t) > timeout);
        if self.held && stale {
            self.held = false;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    pub position: f64,
    pub velocity: f64,
    pub left: KeyLease,
    pub right: KeyLease,
    /// Start of the open counter-strafe window, if any
    pub counter_strafe_started: Option<Instant>,
    /// Left edge of the target zone
    pub target: i32,
    pub score: u32,
}

impl MovementState {
    pub fn counter_strafe_active(&self) -> bool {
        self.counter_strafe_started.is_some()
    }

    /// Field cell the crosshair occupies
    pub fn cell(&self) -> i32 {
        self.position.floor() as i32
    }

    pub fn target_span(&self) -> RangeInclusive<i32> {
        self.target..=self.target + TARGET_WIDTH - 1
    }

    pub fn on_target(&self) -> bool {
        self.target_span().contains(&self.cell())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStatus {
    /// Counter-strafe window open, with the time left in it
    CounterStrafe(Duration),
    Standstill,
    Moving,
}

/// Read-only view of the engine handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub position: f64,
    pub cell: i32,
    pub velocity: f64,
    pub left_held: bool,
    pub right_held: bool,
    pub target: i32,
    pub target_span: RangeInclusive<i32>,
    pub counter_strafe_remaining: Option<Duration>,
    pub score: u32,
    /// Whether shooting right now would score
    pub can_score: bool,
    pub status: MotionStatus,
}

/// Crosshair physics, key-hold inference, counter-strafe window and scoring
/// for a single horizontal axis.
///
/// All three entry points take the caller's notion of "now" and must be
/// called from one thread of control, in arrival order.
#[derive(Debug)]
pub struct MovementEngine<P: TargetPicker = RandomTargetPicker> {
    config: MovementConfig,
    state: MovementState,
    picker: P,
}

impl MovementEngine {
    pub fn new(config: MovementConfig) -> Self {
        Self::with_picker(config, RandomTargetPicker)
    }
}

impl<P: TargetPicker> MovementEngine<P> {
    pub fn with_picker(config: MovementConfig, mut picker: P) -> Self {
        let target = picker.pick(config.target_range());
        Self {
            state: MovementState {
                position: f64::from(config.field_width / 2),
                velocity: 0.0,
                left: KeyLease::default(),
                right: KeyLease::default(),
                counter_strafe_started: None,
                target,
                score: 0,
            },
            config,
            picker,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn on_key_down(&mut self, key: Key, now: Instant) {
        let lease = match key {
            Key::Left => &mut self.state.left,
            Key::Right => &mut self.state.right,
        };
        if !lease.renew(now) {
            return;
        }

        let threshold = self.config.standstill_threshold;
        let opposing = match key {
            Key::Left => self.state.velocity > threshold,
            Key::Right => self.state.velocity < -threshold,
        };
        if opposing {
            debug!(%key, velocity = self.state.velocity, "counter-strafe window opened");
            self.state.velocity = 0.0;
            self.state.counter_strafe_started = Some(now);
        }
    }

    pub fn on_shoot(&mut self, _now: Instant) -> ShotResult {
        if !(self.state.on_target() && self.can_shoot()) {
            return ShotResult::Miss;
        }

        self.state.score += 1;
        self.state.target = self.picker.pick(self.config.target_range());
        info!(
            score = self.state.score,
            next_target = self.state.target,
            "target hit"
        );
        ShotResult::Hit
    }

    pub fn advance_tick(&mut self, now: Instant) {
        let cfg = self.config;
        let state = &mut self.state;

        for (key, lease) in [(Key::Left, &mut state.left), (Key::Right, &mut state.right)] {
            if lease.expire(now, cfg.release_timeout) {
                debug!(%key, "key released");
            }
        }

        if let Some(started) = state.counter_strafe_started {
            if now.saturating_duration_since(started) > cfg.counter_strafe_window {
                debug!("counter-strafe window expired");
                state.counter_strafe_started = None;
            }
        }

        let frozen = state.counter_strafe_active();

        if !frozen {
            match (state.left.is_held(), state.right.is_held()) {
                (true, false) => state.velocity -= cfg.acceleration,
                (false, true) => state.velocity += cfg.acceleration,
                _ => {
                    if state.velocity.abs() > REST_SNAP {
                        state.velocity *= cfg.deceleration;
                    } else {
                        state.velocity = 0.0;
                    }
                }
            }
        }

        state.velocity = state.velocity.clamp(-cfg.max_velocity, cfg.max_velocity);

        if !frozen {
            state.position += state.velocity;
        }

        if state.position < cfg.min_position() {
            state.position = cfg.min_position();
            state.velocity = 0.0;
        } else if state.position >= f64::from(cfg.field_width) - 1.0 {
            state.position = cfg.max_position();
            state.velocity = 0.0;
        }
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let state = &self.state;
        let remaining = state.counter_strafe_started.map(|started| {
            self.config
                .counter_strafe_window
                .saturating_sub(now.saturating_duration_since(started))
        });
        let status = match remaining {
            Some(left) => MotionStatus::CounterStrafe(left),
            None if self.is_standstill() => MotionStatus::Standstill,
            None => MotionStatus::Moving,
        };

        Snapshot {
            position: state.position,
            cell: state.cell(),
            velocity: state.velocity,
            left_held: state.left.is_held(),
            right_held: state.right.is_held(),
            target: state.target,
            target_span: state.target_span(),
            counter_strafe_remaining: remaining,
            score: state.score,
            can_score: state.on_target() && self.can_shoot(),
            status,
        }
    }

    fn is_standstill(&self) -> bool {
        self.state.velocity.abs() < self.config.standstill_threshold
    }

    fn can_shoot(&self) -> bool {
        self.state.counter_strafe_active() || self.is_standstill()
    }
}
