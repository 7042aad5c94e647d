// src/playback/session.rs

//! A controller bound to one computed schedule.

use tracing::debug;

use crate::dag::{Admission, Scenario, Schedule, TaskStates};
use crate::errors::Result;
use crate::playback::controller::{PlaybackController, PlaybackSettings, PlaybackSnapshot};
use crate::playback::PlaybackCommand;
use crate::types::{SimTime, Strategy};

/// Everything a renderer needs for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub playback: PlaybackSnapshot,
    pub states: TaskStates,
    /// Number of chat transcript turns visible at this time.
    pub visible_turns: usize,
}

/// Pairs a [`PlaybackController`] with the [`Schedule`] it plays.
///
/// The controller only knows about time; task states are re-derived from
/// the schedule on every [`frame`](Self::frame) call.
#[derive(Debug)]
pub struct PlaybackSession {
    schedule: Schedule,
    controller: PlaybackController,
    turn_offsets: Vec<SimTime>,
}

impl PlaybackSession {
    /// Play `scenario` the way `strategy` would run it. The total duration
    /// is that strategy's makespan.
    pub fn for_strategy(scenario: &Scenario, strategy: Strategy, settings: PlaybackSettings) -> Self {
        Self::with_admission(scenario, strategy.admission(), settings)
    }

    pub fn with_admission(
        scenario: &Scenario,
        admission: Admission,
        settings: PlaybackSettings,
    ) -> Self {
        let schedule = Schedule::build(scenario, admission);
        let controller = PlaybackController::new(schedule.makespan(), settings);
        let turn_offsets = scenario.transcript().iter().map(|t| t.at).collect();

        debug!(
            scenario = %scenario.name(),
            ?admission,
            total = schedule.makespan(),
            "playback session created"
        );

        Self {
            schedule,
            controller,
            turn_offsets,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Task states at the controller's current time.
    pub fn states(&self) -> TaskStates {
        self.schedule.states_at(self.controller.current_time())
    }

    pub fn frame(&self) -> Frame {
        let now = self.controller.current_time();
        Frame {
            playback: self.controller.snapshot(),
            states: self.schedule.states_at(now),
            visible_turns: self.turn_offsets.partition_point(|&at| at <= now),
        }
    }

    /// Step to the next task transition (or to the end).
    pub fn step_to_next_event(&mut self) {
        let now = self.controller.current_time();
        let next = self
            .schedule
            .next_event_after(now)
            .unwrap_or(self.controller.total_duration());
        self.controller.step(next.saturating_sub(now));
    }

    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    /// Apply a user command.
    pub fn apply(&mut self, command: PlaybackCommand) -> Result<()> {
        match command {
            PlaybackCommand::Play => self.controller.play(),
            PlaybackCommand::Pause => self.controller.pause(),
            PlaybackCommand::Reset => self.controller.reset(),
            PlaybackCommand::Step(delta) => self.controller.step(delta),
            PlaybackCommand::StepToNextEvent => self.step_to_next_event(),
            PlaybackCommand::Seek(t) => self.controller.seek(t),
            PlaybackCommand::SetSpeed(m) => self.controller.set_speed(m)?,
            PlaybackCommand::Shutdown => {}
        }
        Ok(())
    }
}
