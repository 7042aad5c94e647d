// src/playback/mod.rs

//! Playback of a computed schedule over simulated time.
//!
//! The pure state machine lives in [`controller`]; [`session`] binds it to a
//! schedule and produces render frames; the async tick loop is implemented
//! in [`runtime`].

use crate::types::SimTime;

/// User commands accepted by a playback session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Reset,
    /// Advance by a fixed number of simulated units (pauses auto-advance).
    Step(SimTime),
    /// Advance to the next task transition (pauses auto-advance).
    StepToNextEvent,
    /// Jump to an absolute simulated time (pauses auto-advance).
    Seek(SimTime),
    SetSpeed(f64),
    /// Stop the runtime loop.
    Shutdown,
}

/// Options for the async playback shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackRuntimeOptions {
    /// Exit the loop once playback reaches `finished`.
    pub exit_when_finished: bool,
}

pub mod controller;
pub mod runtime;
pub mod session;

pub use controller::{
    PlaybackClock, PlaybackController, PlaybackSettings, PlaybackSnapshot, PlaybackState,
};
pub use runtime::PlaybackRuntime;
pub use session::{Frame, PlaybackSession};
