mod clock;
mod controller;
mod driver;
pub mod machine;
mod session;

pub use clock::{ManualClock, MonotonicClock, PhaseClock, SystemClock};
pub use controller::{SessionController, SubscriptionId};
pub use driver::{apply, drive, Command, DriveExit, TokioClock};
pub use machine::{
    advance, begin, plan, progress_pct, tick, total_seconds, PhaseChange, Segment, TickOutcome,
    Transition, PREP_SECONDS,
};
pub use session::{Phase, SessionConfig, SessionState};
