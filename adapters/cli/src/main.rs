#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a single race and prints its results.

mod args;
mod session;

use std::{io, process::ExitCode};

use anyhow::{Context, Result as AnyResult};
use clap::{error::ErrorKind, CommandFactory, Parser};
use env_logger::Env;
use log::info;
use racetrack_core::validate_participant_count;
use racetrack_rendering::TerminalBackend;
use racetrack_system_drivers::DriverRegistry;
use racetrack_world::World;

use crate::{args::Args, session::RaceSummary};

/// Exit status reported for missing or malformed parameters.
const USAGE_EXIT_CODE: u8 = 2;

/// Entry point for the racetrack command-line interface.
fn main() -> AnyResult<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => return Ok(usage(&error)),
    };
    let summary = race(&args)?;
    print!("{summary}");
    Ok(ExitCode::SUCCESS)
}

/// Reports a parameter error followed by the description of every parameter.
fn usage(error: &clap::Error) -> ExitCode {
    let _ = error.print();
    if matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) {
        return ExitCode::SUCCESS;
    }
    eprintln!();
    eprintln!("{}", Args::command().render_long_help());
    ExitCode::from(USAGE_EXIT_CODE)
}

fn race(args: &Args) -> AnyResult<RaceSummary> {
    let config = args.config();
    config.validate().context("invalid race configuration")?;
    validate_participant_count(args.participants.len()).context("invalid participant list")?;

    let registry = DriverRegistry::with_stock_drivers();
    session::check_kinds(&registry, &args.participants).context("invalid participant list")?;

    let seed = config.seed;
    let mut world = World::generate(config, args.participants.len())
        .context("failed to set up the race")?;
    let mut entrants = session::seat(&world, &registry, &args.participants, args.replay)?;
    info!("racing {} participant(s) on seed {seed}", entrants.len());

    let mut backend = TerminalBackend::new(io::stdout());
    let reason = session::run(&mut world, &mut entrants, args.render, &mut backend)?;
    Ok(RaceSummary::collect(&world, &entrants, reason))
}
