use clap::ValueEnum;
use roundclock_core::cue::RELEASE_TAIL;
use roundclock_core::{Config, Cue};

use super::CliResult;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueName {
    Countdown,
    Go,
    Rest,
    Finish,
}

impl From<CueName> for Cue {
    fn from(name: CueName) -> Self {
        match name {
            CueName::Countdown => Cue::Countdown,
            CueName::Go => Cue::Go,
            CueName::Rest => Cue::RestStart,
            CueName::Finish => Cue::Finish,
        }
    }
}

pub fn run(name: CueName) -> CliResult {
    let config = Config::load()?;
    let cue = Cue::from(name);

    let mut engine = super::cue_engine(&config);
    engine.set_sound_enabled(true);
    engine.unlock();
    engine.play(cue);

    if engine.has_output() {
        std::thread::sleep(cue.length() + RELEASE_TAIL);
    }

    println!("{}", serde_json::to_string(&cue.events())?);
    Ok(())
}
