//! Interactive session.
//!
//! The controller runs on a current-thread tokio runtime. A plain thread
//! reads single-letter commands from stdin and forwards them over the
//! driver's channel. Every selected view is its own subscriber.

use std::io::{self, BufRead, Write};

use clap::{Args, ValueEnum};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use roundclock_core::timer::{drive, Command, DriveExit};
use roundclock_core::{Config, Event, Phase, SessionController, SessionState};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use super::{CliResult, SessionArgs};

const KEYS: &str = "keys: g start, p pause, r resume, s sound, x reset, q quit";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One self-overwriting status line
    Inline,
    /// One row per second
    Sheet,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Start muted
    #[arg(long)]
    pub no_sound: bool,
    /// How to display the countdown; repeat to show several
    #[arg(long, value_enum, default_values_t = [View::Inline])]
    pub view: Vec<View>,
    /// Print events as JSON lines instead of a view
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> CliResult {
    let config = Config::load()?;
    let mut session = args.session.resolve(&config);
    if args.no_sound {
        session.sound_enabled = false;
    }
    session.validate()?;

    let mut controller = SessionController::new(super::cue_engine(&config));
    if !args.json {
        for view in args.view.iter().copied() {
            match view {
                View::Inline => {
                    let mut inline = InlineView::default();
                    controller.subscribe(move |state| inline.render(state));
                }
                View::Sheet => {
                    let mut sheet = SheetView::default();
                    controller.subscribe(move |state| sheet.render(state));
                }
            }
        }
        eprintln!("{KEYS}");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(Command::Configure(session))?;
    tx.send(Command::Start)?;
    spawn_input(tx);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let json = args.json;
    let exit = runtime.block_on(drive(&mut controller, &mut rx, |event| report(event, json)));

    if !json {
        println!();
    }
    match exit {
        DriveExit::Finished => debug!("session finished"),
        DriveExit::Shutdown => debug!("quit requested"),
        DriveExit::Disconnected => debug!(phase = %controller.state().phase, "input closed with no session ticking"),
    }
    Ok(())
}

fn parse_key(line: &str) -> Option<Command> {
    match line.trim() {
        "g" => Some(Command::Start),
        "p" => Some(Command::Pause),
        "r" => Some(Command::Resume),
        "s" => Some(Command::ToggleSound),
        "x" => Some(Command::Reset),
        "q" => Some(Command::Shutdown),
        _ => None,
    }
}

fn spawn_input(tx: UnboundedSender<Command>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_key(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("{KEYS}"),
            }
        }
        debug!("stdin closed");
    });
}

fn report(event: roundclock_core::error::Result<Event>, json: bool) {
    match event {
        Ok(event) if json => match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("failed to serialize event: {e}"),
        },
        Ok(Event::SoundToggled { enabled, .. }) => {
            eprintln!("\nsound {}", if enabled { "on" } else { "off" });
        }
        Ok(_) => {}
        Err(e) => eprintln!("\nerror: {e}"),
    }
}

fn clock_face(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn describe(state: &SessionState) -> String {
    match state.phase {
        Phase::Idle => "ready (g to start)".to_string(),
        Phase::Finished => format!("done, {} rounds", state.total_rounds),
        phase => format!(
            "{:<5} round {}/{}  {}{}",
            phase.as_str().to_uppercase(),
            state.current_round,
            state.total_rounds,
            clock_face(state.remaining_seconds),
            if state.running { "" } else { "  paused" }
        ),
    }
}

#[derive(Default)]
struct InlineView {
    last_phase: Option<Phase>,
}

impl InlineView {
    fn render(&mut self, state: &SessionState) {
        if let Err(e) = self.draw(&mut io::stdout().lock(), state) {
            debug!("failed to draw status line: {e}");
        }
    }

    /// Overwrite the current line; a new phase keeps the previous line.
    fn draw(&mut self, out: &mut impl Write, state: &SessionState) -> io::Result<()> {
        if self.last_phase.is_some_and(|phase| phase != state.phase) {
            writeln!(out)?;
        }
        self.last_phase = Some(state.phase);
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(describe(state)))?;
        out.flush()
    }
}

#[derive(Default)]
struct SheetView {
    last: Option<SessionState>,
}

impl SheetView {
    fn render(&mut self, state: &SessionState) {
        if self.last.as_ref() == Some(state) {
            return;
        }
        if self.last.is_none() {
            println!("{:<8} {:>5} {:>5}  {}", "PHASE", "ROUND", "LEFT", "STATE");
        }
        self.last = Some(*state);
        let round = format!("{}/{}", state.current_round, state.total_rounds);
        println!(
            "{:<8} {:>5} {:>5}  {}",
            state.phase.as_str(),
            round,
            clock_face(state.remaining_seconds),
            if state.running { "running" } else { "stopped" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_key("p"), Some(Command::Pause));
        assert_eq!(parse_key(" r \n"), Some(Command::Resume));
        assert_eq!(parse_key("s"), Some(Command::ToggleSound));
        assert_eq!(parse_key("x"), Some(Command::Reset));
        assert_eq!(parse_key("q"), Some(Command::Shutdown));
        assert_eq!(parse_key("g"), Some(Command::Start));
        assert_eq!(parse_key("pause"), None);
    }

    #[test]
    fn describes_running_and_paused_states() {
        let mut state = SessionState {
            phase: Phase::Work,
            current_round: 2,
            total_rounds: 3,
            remaining_seconds: 75,
            running: true,
        };
        assert_eq!(describe(&state), "WORK  round 2/3  01:15");
        state.running = false;
        assert_eq!(describe(&state), "WORK  round 2/3  01:15  paused");
        state.phase = Phase::Finished;
        assert_eq!(describe(&state), "done, 3 rounds");
    }

    #[test]
    fn inline_view_redraws_in_place_until_the_phase_changes() {
        let mut view = InlineView::default();
        let mut out = Vec::new();
        let mut state = SessionState {
            phase: Phase::Prep,
            current_round: 1,
            total_rounds: 2,
            remaining_seconds: 2,
            running: true,
        };
        view.draw(&mut out, &state).unwrap();
        state.remaining_seconds = 1;
        view.draw(&mut out, &state).unwrap();
        let same_phase = String::from_utf8(out.clone()).unwrap();
        assert!(!same_phase.contains('\n'));
        assert!(same_phase.ends_with("PREP  round 1/2  00:01"));

        state.phase = Phase::Work;
        state.remaining_seconds = 20;
        view.draw(&mut out, &state).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        let (kept, current) = text.split_once('\n').unwrap();
        assert!(kept.ends_with("00:01"));
        assert!(current.ends_with("WORK  round 1/2  00:20"));
        assert!(!current.contains("PREP"));
    }
}
