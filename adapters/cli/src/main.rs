#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that grows the sprint island.

mod headless;
mod script;
mod simulation;
mod sources;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use grove_core::EngineConfig;
use grove_engine::GrowthEngine;
use grove_rendering::{Color, Presentation, RenderingBackend};
use grove_rendering_macroquad::MacroquadBackend;

use self::{
    headless::run_headless,
    script::parse_script,
    simulation::Simulation,
    sources::{demo_summaries, load_config, load_records, load_summaries, SprintSource},
};

const WINDOW_TITLE: &str = "Sprint Grove";
const SKY_COLOR: Color = Color::from_rgb_u8(0x87, 0xCE, 0xEB);

/// Grows one tree per sprint on a floating island.
#[derive(Debug, Parser)]
#[command(name = "sprint-grove", version)]
struct CliArgs {
    /// JSON file with precomputed sprint summaries.
    #[arg(long, value_name = "PATH", conflicts_with = "records")]
    summaries: Option<PathBuf>,
    /// JSON file with raw sprint board records to aggregate.
    #[arg(long, value_name = "PATH")]
    records: Option<PathBuf>,
    /// TOML file overriding motion, camera and slot tuning.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Runs without a window and prints the final state.
    #[arg(long)]
    headless: bool,
    /// Number of frames ticked by a headless run.
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// Input replayed by a headless run, e.g. `0:activate:S1,90:dismiss`.
    #[arg(long, value_name = "SCRIPT", default_value = "")]
    script: String,
    /// Prints every drawn frame of a headless run.
    #[arg(long)]
    trace_frames: bool,
    /// TOML manifest of canopy textures for the four stages.
    #[arg(long, value_name = "PATH")]
    stage_manifest: Option<PathBuf>,
    /// Renders as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,
}

/// Entry point for the Sprint Grove command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = load_config(args.config.as_deref())?;
    let source = sprint_source(&args)?;
    let simulation = Simulation::new(build_engine(config, source)?);

    if args.headless {
        let script = parse_script(&args.script).context("invalid --script value")?;
        let mut simulation = simulation;
        let stdout = io::stdout();
        let _ = run_headless(
            &mut simulation,
            args.frames,
            &script,
            args.trace_frames,
            &mut stdout.lock(),
        )?;
        return Ok(());
    }

    let scene = simulation.initial_scene()?;
    let presentation = Presentation::new(WINDOW_TITLE, SKY_COLOR, scene);
    let mut simulation = simulation;
    MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_stage_manifest(args.stage_manifest)
        .run(presentation, move |_dt, input, scene| {
            simulation.advance(input, scene);
        })
}

fn sprint_source(args: &CliArgs) -> Result<SprintSource> {
    if let Some(path) = &args.summaries {
        return Ok(SprintSource::Summaries(load_summaries(path)?));
    }
    if let Some(path) = &args.records {
        return Ok(SprintSource::Records(load_records(path)?));
    }
    log::info!("no sprint data provided; showing demo sprints");
    Ok(SprintSource::Summaries(demo_summaries()))
}

fn build_engine(config: EngineConfig, source: SprintSource) -> Result<GrowthEngine> {
    let mut engine = GrowthEngine::new(config).context("invalid engine configuration")?;
    match source {
        SprintSource::Summaries(summaries) => {
            let nodes = engine.sync(summaries);
            log::info!("planted {} sprints", nodes.len());
        }
        SprintSource::Records(records) => {
            log::info!("aggregating {} sprint boards", records.len());
            engine.submit_records(records);
        }
    }
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_well_formed() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn summaries_and_records_conflict() {
        let result = CliArgs::try_parse_from([
            "sprint-grove",
            "--summaries",
            "a.json",
            "--records",
            "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn records_are_synced_on_the_first_frame() {
        let records = vec![grove_core::SprintRecord {
            id: grove_core::SprintId::new("S1"),
            name: None,
            columns: Vec::new(),
        }];
        let mut engine = build_engine(EngineConfig::default(), SprintSource::Records(records))
            .expect("engine builds");
        assert!(engine.node_view().is_empty());

        engine.tick();

        assert_eq!(engine.node_view().len(), 1);
    }
}
