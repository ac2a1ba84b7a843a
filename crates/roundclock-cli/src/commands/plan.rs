use roundclock_core::timer::{plan, total_seconds};
use roundclock_core::Config;

use super::{CliResult, SessionArgs};

pub fn run(args: SessionArgs) -> CliResult {
    let config = Config::load()?;
    let session = args.resolve(&config);
    session.validate()?;

    let output = serde_json::json!({
        "config": session,
        "segments": plan(&session),
        "total_seconds": total_seconds(&session),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
