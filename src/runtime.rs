use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum StrafeEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait StrafeEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<StrafeEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<StrafeEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => StrafeEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => StrafeEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => StrafeEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event stream failed");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StrafeEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StrafeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<StrafeEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StrafeEvent>) -> Self {
        Self { rx }
    }
}

impl StrafeEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StrafeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that merges input events and ticks into one ordered stream.
///
/// Ticks fire on a deadline rather than on input silence, so a steady
/// stream of key repeats cannot starve the physics.
pub struct Runner<E: StrafeEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: StrafeEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next tick deadline at most and returns the next event,
    /// or Tick once the deadline has passed
    pub fn step(&mut self) -> StrafeEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.tick(now);
        }

        let remaining = self.next_tick - now;
        match self.event_source.recv_timeout(remaining) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(remaining);
                self.tick(Instant::now())
            }
        }
    }

    fn tick(&mut self, now: Instant) -> StrafeEvent {
        self.next_tick = now + self.ticker.interval();
        StrafeEvent::Tick
    }
}
