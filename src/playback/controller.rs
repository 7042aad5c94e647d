// src/playback/controller.rs

//! Pure playback state machine.
//!
//! The controller owns simulated time and the play/pause/step/reset
//! transitions. It performs no IO and owns no timer: the async shell in
//! [`crate::playback::runtime`] calls [`PlaybackController::tick`] from a
//! single interval, and tests call it directly.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::errors::{Result, SimError};
use crate::subscription::{publish_if_changed, Subscription};
use crate::types::SimTime;

/// Default wall-clock period between ticks.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Tick configuration for a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    /// Wall-clock period of one tick.
    pub tick: Duration,
    /// Simulated units elapsed per tick at speed 1.0. Zero is treated as one.
    pub units_per_tick: SimTime,
    /// Initial speed multiplier.
    pub speed: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            units_per_tick: 1,
            speed: 1.0,
        }
    }
}

/// Mutable simulated clock. Only the controller writes to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    pub current_time: SimTime,
    pub is_running: bool,
    pub speed_multiplier: f64,
    /// Fraction of a unit carried between ticks at non-integral speeds.
    carry: f64,
}

/// What subscribers observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub current_time: SimTime,
    pub is_running: bool,
}

#[derive(Debug)]
pub struct PlaybackController {
    state: PlaybackState,
    clock: PlaybackClock,
    total_duration: SimTime,
    units_per_tick: SimTime,
    notifier: watch::Sender<PlaybackSnapshot>,
}

impl PlaybackController {
    /// Create an idle controller that plays from 0 to `total_duration`.
    pub fn new(total_duration: SimTime, settings: PlaybackSettings) -> Self {
        let speed = if settings.speed.is_finite() && settings.speed > 0.0 {
            settings.speed
        } else {
            1.0
        };
        let clock = PlaybackClock {
            current_time: 0,
            is_running: false,
            speed_multiplier: speed,
            carry: 0.0,
        };
        let initial = PlaybackSnapshot {
            state: PlaybackState::Idle,
            current_time: 0,
            is_running: false,
        };
        let (notifier, _) = watch::channel(initial);

        Self {
            state: PlaybackState::Idle,
            clock,
            total_duration,
            units_per_tick: settings.units_per_tick.max(1),
            notifier,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn current_time(&self) -> SimTime {
        self.clock.current_time
    }

    pub fn total_duration(&self) -> SimTime {
        self.total_duration
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed_multiplier
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            current_time: self.clock.current_time,
            is_running: self.clock.is_running,
        }
    }

    /// Observe snapshot changes.
    pub fn subscribe(&self) -> Subscription<PlaybackSnapshot> {
        Subscription::new(self.notifier.subscribe())
    }

    /// `idle`/`paused` -> `playing`. Resuming keeps the current time.
    ///
    /// A no-op while playing or finished; a finished playback must be reset
    /// first.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Idle | PlaybackState::Paused => {
                if self.clock.current_time >= self.total_duration {
                    self.transition(PlaybackState::Finished);
                } else {
                    self.transition(PlaybackState::Playing);
                }
            }
            PlaybackState::Playing => {}
            PlaybackState::Finished => {
                debug!("play requested on finished playback; reset first");
            }
        }
        self.publish();
    }

    /// `playing` -> `paused`; a no-op otherwise.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.transition(PlaybackState::Paused);
        }
        self.publish();
    }

    /// Any state -> `idle` at time 0.
    pub fn reset(&mut self) {
        self.clock.current_time = 0;
        self.clock.carry = 0.0;
        self.transition(PlaybackState::Idle);
        self.publish();
    }

    /// Advance time by `delta` regardless of state.
    ///
    /// Stepping always stops auto-advance: the controller ends up `paused`,
    /// or `finished` if the step reached the end.
    pub fn step(&mut self, delta: SimTime) {
        let target = self.clock.current_time.saturating_add(delta);
        self.move_to(target);
    }

    /// Jump to an arbitrary time (clamped to the total duration). Like
    /// [`step`](Self::step), this pauses auto-advance.
    pub fn seek(&mut self, time: SimTime) {
        self.move_to(time);
    }

    /// Advance by one tick's worth of simulated time.
    ///
    /// Only has an effect while `playing`. Returns `true` if time moved.
    pub fn tick(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        let exact = self.units_per_tick as f64 * self.clock.speed_multiplier + self.clock.carry;
        let whole = exact.floor();
        self.clock.carry = exact - whole;

        let before = self.clock.current_time;
        let target = before.saturating_add(whole as SimTime);
        if target >= self.total_duration {
            self.clock.current_time = self.total_duration;
            self.clock.carry = 0.0;
            self.transition(PlaybackState::Finished);
        } else {
            self.clock.current_time = target;
        }
        self.publish();

        self.clock.current_time != before
    }

    /// Change the speed multiplier. Must be finite and positive.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<()> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(SimError::ConfigError(format!(
                "speed multiplier must be > 0 (got {multiplier})"
            )));
        }
        self.clock.speed_multiplier = multiplier;
        debug!(speed = multiplier, "playback speed changed");
        Ok(())
    }

    fn move_to(&mut self, time: SimTime) {
        self.clock.current_time = time.min(self.total_duration);
        self.clock.carry = 0.0;
        if self.clock.current_time >= self.total_duration {
            self.transition(PlaybackState::Finished);
        } else {
            self.transition(PlaybackState::Paused);
        }
        self.publish();
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, time = self.clock.current_time, "playback transition");
        }
        self.state = next;
        self.clock.is_running = next == PlaybackState::Playing;
    }

    fn publish(&self) {
        publish_if_changed(&self.notifier, self.snapshot());
    }
}
