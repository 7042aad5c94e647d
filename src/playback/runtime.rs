// src/playback/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::playback::controller::PlaybackState;
use crate::playback::session::{Frame, PlaybackSession};
use crate::playback::{PlaybackCommand, PlaybackRuntimeOptions};
use crate::subscription::{publish_if_changed, Subscription};

/// Drives a [`PlaybackSession`] from one periodic timer and a command
/// channel.
///
/// This is a thin async shell: every semantic decision lives in the session
/// and its controller. The loop only decides *when* to call them:
/// - commands are always drained before a pending tick (`biased` select), so
///   a pause or reset is processed before the next tick can run;
/// - the interval is only polled while playing, so no tick is delivered
///   after a stop.
pub struct PlaybackRuntime {
    session: PlaybackSession,
    commands: mpsc::Receiver<PlaybackCommand>,
    frames: watch::Sender<Frame>,
    tick: Duration,
    options: PlaybackRuntimeOptions,
}

impl fmt::Debug for PlaybackRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRuntime")
            .field("session", &self.session)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

enum Wake {
    Command(Option<PlaybackCommand>),
    Tick,
}

impl PlaybackRuntime {
    pub fn new(
        session: PlaybackSession,
        commands: mpsc::Receiver<PlaybackCommand>,
        tick: Duration,
        options: PlaybackRuntimeOptions,
    ) -> Self {
        let (frames, _) = watch::channel(session.frame());
        Self {
            session,
            commands,
            frames,
            tick,
            options,
        }
    }

    /// Observe frames. Only changed frames are delivered.
    pub fn subscribe(&self) -> Subscription<Frame> {
        Subscription::new(self.frames.subscribe())
    }

    /// Main loop. Returns the last frame once the command channel closes,
    /// shutdown is requested, or (with `exit_when_finished`) playback ends.
    pub async fn run(mut self) -> Result<Frame> {
        info!(
            total = self.session.controller().total_duration(),
            tick_ms = self.tick.as_millis() as u64,
            "playback runtime started"
        );

        let mut ticker = interval(self.tick.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let wake = if self.session.controller().is_playing() {
                tokio::select! {
                    biased;
                    cmd = self.commands.recv() => Wake::Command(cmd),
                    _ = ticker.tick() => Wake::Tick,
                }
            } else {
                Wake::Command(self.commands.recv().await)
            };

            match wake {
                Wake::Tick => {
                    self.session.tick();
                }
                Wake::Command(None) => {
                    info!("playback command channel closed; exiting");
                    break;
                }
                Wake::Command(Some(PlaybackCommand::Shutdown)) => {
                    info!("playback shutdown requested");
                    break;
                }
                Wake::Command(Some(command)) => {
                    debug!(?command, "playback command received");
                    let resuming = matches!(command, PlaybackCommand::Play)
                        && !self.session.controller().is_playing();
                    if let Err(e) = self.session.apply(command) {
                        warn!(error = %e, "playback command rejected");
                    }
                    if resuming {
                        // First tick one full period after play, not immediately.
                        ticker.reset();
                    }
                }
            }

            publish_if_changed(&self.frames, self.session.frame());

            if self.options.exit_when_finished
                && self.session.controller().state() == PlaybackState::Finished
            {
                info!("playback finished; stopping runtime");
                break;
            }
        }

        Ok(self.session.frame())
    }
}
