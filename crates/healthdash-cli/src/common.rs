//! Shared plumbing for commands that read records.

use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use healthdash_core::clock::{Clock, FixedClock};
use healthdash_core::{
    evaluate, Config, DashboardInput, DashboardReport, DataStore, DoseMatcher, Settings,
    SlotTiming,
};
use serde::Serialize;
use tracing::debug;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Flags accepted by every subcommand.
pub struct Globals {
    pub data_dir: Option<PathBuf>,
    pub now: Option<String>,
}

/// Loaded config, record store and the evaluation instant.
pub struct Context {
    pub config: Config,
    pub store: DataStore,
    pub now: NaiveDateTime,
}

impl Globals {
    pub fn context(&self) -> Result<Context, Box<dyn Error>> {
        let config = Config::load()?;
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => config.records_dir()?,
        };
        let now = match &self.now {
            Some(raw) => FixedClock::parse(raw)?.now(),
            None => config.clock()?.now(),
        };
        debug!(dir = %dir.display(), %now, "command context ready");
        Ok(Context {
            config,
            store: DataStore::new(dir),
            now,
        })
    }
}

impl Context {
    pub fn input(&self) -> DashboardInput {
        self.store.load_input()
    }

    pub fn report(&self) -> DashboardReport {
        evaluate(&self.input(), self.now, &self.config.settings())
    }
}

/// Run `f` with a matcher over the input's schedule.
pub fn with_matcher<R>(
    input: &DashboardInput,
    settings: &Settings,
    f: impl FnOnce(&DoseMatcher<'_>) -> R,
) -> R {
    let aliases = settings.adherence.alias_table();
    let timing = SlotTiming::new(&input.protocol.schedule, settings.timing);
    let matcher = DoseMatcher::new(timing, &aliases, settings.adherence.match_policy);
    f(&matcher)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
