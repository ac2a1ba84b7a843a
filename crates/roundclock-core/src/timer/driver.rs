//! Async control loop around a [`SessionController`].
//!
//! Sleeps until the clock's next absolute tick boundary, pumps the
//! controller, and applies control commands as they arrive. All state is
//! touched from this one task.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use super::clock::MonotonicClock;
use super::controller::SessionController;
use super::session::{Phase, SessionConfig};
use crate::cue::{Cue, RELEASE_TAIL};
use crate::error::Result;
use crate::events::Event;

/// User intents forwarded from a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Configure(SessionConfig),
    Start,
    Pause,
    Resume,
    Reset,
    ToggleSound,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveExit {
    /// The session reached FINISHED.
    Finished,
    /// A `Shutdown` command arrived; the session was reset.
    Shutdown,
    /// The command channel closed while no session was ticking.
    Disconnected,
}

/// Monotonic time from tokio's clock, so paused-time tests drive it too.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Apply one command to the controller.
pub fn apply<C: MonotonicClock>(controller: &mut SessionController<C>, command: Command) -> Result<Event> {
    match command {
        Command::Configure(config) => controller.configure(config),
        Command::Start => controller.start(),
        Command::Pause => controller.pause(),
        Command::Resume => controller.resume(),
        Command::Reset | Command::Shutdown => Ok(controller.reset()),
        Command::ToggleSound => Ok(controller.toggle_sound()),
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending::<()>().await,
    }
}

/// Run until the session finishes, a `Shutdown` arrives, or nothing can
/// happen any more. Every event (and every rejected command) is handed to
/// `on_event` in order. On FINISHED it returns only once the finish cue has
/// had time to play out.
pub async fn drive<C, F>(
    controller: &mut SessionController<C>,
    commands: &mut UnboundedReceiver<Command>,
    mut on_event: F,
) -> DriveExit
where
    C: MonotonicClock,
    F: FnMut(Result<Event>),
{
    let mut commands_open = true;
    loop {
        if controller.state().phase == Phase::Finished {
            return DriveExit::Finished;
        }
        if !commands_open && !controller.state().running {
            return DriveExit::Disconnected;
        }

        let wait = controller.until_next_tick();
        tokio::select! {
            biased;
            command = commands.recv(), if commands_open => match command {
                Some(Command::Shutdown) => {
                    on_event(apply(controller, Command::Shutdown));
                    return DriveExit::Shutdown;
                }
                Some(command) => on_event(apply(controller, command)),
                None => {
                    debug!("command channel closed");
                    commands_open = false;
                }
            },
            _ = sleep_for(wait) => match controller.pump() {
                Ok(events) => {
                    let finished = events.iter().any(|e| matches!(e, Event::SessionFinished { .. }));
                    events.into_iter().for_each(|e| on_event(Ok(e)));
                    if finished {
                        // the fanfare is still queued on the output
                        tokio::time::sleep(Cue::Finish.length() + RELEASE_TAIL).await;
                    }
                }
                Err(e) => on_event(Err(e)),
            },
        }
    }
}
