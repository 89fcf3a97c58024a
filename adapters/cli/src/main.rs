#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a maze GPS run and prints the revealed map.

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::UVec2;
use log::{debug, error, info};
use maze_gps_core::GridDimensions;
use maze_gps_rendering::{Bitmap, MapLayout, RevealMap};
use maze_gps_world::{self as world, MazeState};

use script::{MazeSettings, RunScript};

/// Replays maze GPS commands and prints the resulting pose and map.
#[derive(Debug, Parser)]
#[command(name = "maze-gps", version, allow_negative_numbers = true)]
struct Cli {
    /// TOML run script with an optional `[maze]` table and `[[commands]]` list.
    script: Option<PathBuf>,
    /// Number of maze rows.
    #[arg(long)]
    rows: Option<i32>,
    /// Number of maze columns.
    #[arg(long)]
    columns: Option<i32>,
    /// Starting column of the robot.
    #[arg(long)]
    start_x: Option<i32>,
    /// Starting row of the robot.
    #[arg(long)]
    start_y: Option<i32>,
    /// Starting orientation (0=N, 1=E, 2=S, 3=W; any integer is normalized).
    #[arg(long)]
    orientation: Option<i32>,
    /// Edge length of a cell on the printed map, in characters.
    #[arg(long)]
    cell_length: Option<u32>,
}

impl Cli {
    fn settings(&self) -> MazeSettings {
        MazeSettings {
            rows: self.rows,
            columns: self.columns,
            start_x: self.start_x,
            start_y: self.start_y,
            orientation: self.orientation,
            cell_length: self.cell_length,
        }
    }
}

/// Entry point for the maze GPS command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let script = match &cli.script {
        Some(path) => RunScript::load(path)?,
        None => RunScript::default(),
    };
    let config = cli
        .settings()
        .or(script.maze)
        .resolve(MapLayout::DEFAULT_CELL_LENGTH);

    let layout = MapLayout::new(config.cell_length, UVec2::ZERO)?;
    let dimensions = GridDimensions::try_new(config.rows, config.columns)
        .context("failed to construct maze state")?;
    let size = layout
        .surface_size(dimensions)
        .context("maze cannot be printed")?;
    debug!("printing on a {}x{} character map", size.x, size.y);

    let mut state = MazeState::new(
        RevealMap::new(Bitmap::new(), layout),
        config.start_x,
        config.start_y,
        config.orientation,
        config.rows,
        config.columns,
    )
    .context("failed to construct maze state")?;
    info!(
        "replaying {} commands on a {} maze",
        script.commands.len(),
        state.dimensions()
    );

    let mut events = Vec::new();
    for (index, command) in script.commands.into_iter().enumerate() {
        if let Err(failure) = world::apply(&mut state, command.clone(), &mut events) {
            error!(
                "halting at {} facing {}: {failure}",
                state.coordinates(),
                state.orientation()
            );
            return Err(failure).with_context(|| format!("command {index} ({command:?}) failed"));
        }
        for event in events.drain(..) {
            info!("{event:?}");
        }
    }

    println!(
        "pose: {} facing {}",
        state.coordinates(),
        state.orientation()
    );
    print!("{}", state.renderer().surface());
    Ok(())
}
