#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative maze state for a robot navigating a grid maze.
//!
//! [`MazeState`] is the single source of navigational truth: it tracks the
//! robot's pose and everything discovered about each cell. Wall discoveries are
//! forwarded to the [`MapRenderer`] the store owns, so tests can attach a
//! [`NullRenderer`] or a recording fake instead of a drawing surface.
//!
//! The store is single-writer. Callers that mutate it from several threads
//! must serialize access themselves.

use log::{debug, trace, warn};
use maze_gps_core::{
    CellRecord, Command, Direction, DirectionSet, Event, GridDimensions, MapRenderer, MazeError,
    NullRenderer, Pose, Position,
};

/// Pose and per-cell knowledge for one maze-solving run.
#[derive(Debug)]
pub struct MazeState<R = NullRenderer> {
    pose: Pose,
    dimensions: GridDimensions,
    cells: Vec<CellRecord>,
    renderer: R,
}

impl MazeState<NullRenderer> {
    /// Creates a store without a drawing surface attached.
    pub fn headless(
        start_x: i32,
        start_y: i32,
        start_orientation: i32,
        rows: i32,
        columns: i32,
    ) -> Result<Self, MazeError> {
        Self::new(
            NullRenderer,
            start_x,
            start_y,
            start_orientation,
            rows,
            columns,
        )
    }
}

impl<R: MapRenderer> MazeState<R> {
    /// Creates a store with boundary walls seeded and the renderer cleared.
    ///
    /// `start_orientation` may be any integer and is normalized modulo four.
    /// Fails with [`MazeError::InvalidDimension`] when `rows` or `columns` is
    /// not positive, and with [`MazeError::GridTooLarge`] when the cells cannot
    /// be allocated.
    pub fn new(
        renderer: R,
        start_x: i32,
        start_y: i32,
        start_orientation: i32,
        rows: i32,
        columns: i32,
    ) -> Result<Self, MazeError> {
        let dimensions = GridDimensions::try_new(rows, columns)?;
        let count = dimensions.cell_count();
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| MazeError::GridTooLarge { dimensions })?;
        cells.resize(count, CellRecord::default());

        let mut state = Self {
            pose: Pose::new(
                Position::new(start_x, start_y),
                Direction::normalized(start_orientation),
            ),
            dimensions,
            cells,
            renderer,
        };
        state.seed_boundaries();
        state.renderer.reset(dimensions);
        debug!(
            "maze state created: {} at {} facing {}",
            dimensions,
            state.pose.position(),
            state.pose.orientation()
        );
        Ok(state)
    }

    /// Stores a new orientation and returns its normalized value.
    pub fn update_orientation(&mut self, orientation: i32) -> Direction {
        let normalized = Direction::normalized(orientation);
        self.pose = Pose::new(self.pose.position(), normalized);
        normalized
    }

    /// Moves the pose `step` cells along the current orientation.
    ///
    /// Call once per completed cell-to-cell transition. The move is not
    /// validated against the grid or the recorded walls.
    pub fn update_position(&mut self, step: i32) -> Position {
        let position = self.pose.position().stepped(self.pose.orientation(), step);
        self.pose = Pose::new(position, self.pose.orientation());
        position
    }

    /// Clears every cell, reseeds the boundary walls and places the robot anew.
    pub fn reset(&mut self, start_x: i32, start_y: i32, start_orientation: i32) {
        self.renderer.reset(self.dimensions);
        self.pose = Pose::new(
            Position::new(start_x, start_y),
            Direction::normalized(start_orientation),
        );
        self.cells.fill(CellRecord::default());
        self.seed_boundaries();
        debug!(
            "maze state reset to {} facing {}",
            self.pose.position(),
            self.pose.orientation()
        );
    }

    /// Redraws a blank map without touching the grid or the pose.
    pub fn prepare_map(&mut self) {
        self.renderer.reset(self.dimensions);
    }

    /// Marks the cell visited, freezing its wall data.
    ///
    /// Call immediately before leaving the cell, after its walls were recorded.
    pub fn set_visited(&mut self, cell: Position) -> Result<(), MazeError> {
        let index = self.index_of(cell)?;
        self.cells[index].mark_visited();
        Ok(())
    }

    /// Records that `direction` was traversed at `cell`.
    ///
    /// Raw directions outside `0..4` are ignored without error; callers are
    /// responsible for passing a valid encoding.
    pub fn set_direction_taken(&mut self, cell: Position, direction: i32) -> Result<(), MazeError> {
        let Some(direction) = Direction::from_raw(direction) else {
            trace!("ignoring direction {direction} taken at {cell}");
            return Ok(());
        };

        let index = self.index_of(cell)?;
        self.cells[index].mark_taken(direction);
        Ok(())
    }

    /// Records the walls discovered for `cell` and draws each of them.
    ///
    /// Returns `Ok(false)` without mutating anything when the cell is already
    /// visited, and `Ok(true)` otherwise.
    pub fn set_walls(&mut self, cell: Position, walls: DirectionSet) -> Result<bool, MazeError> {
        let index = self.index_of(cell)?;
        if self.cells[index].is_visited() {
            debug!("walls for visited cell {cell} are frozen");
            return Ok(false);
        }

        self.cells[index].add_walls(walls);
        for side in walls.iter() {
            self.renderer.draw_wall(cell, side);
        }
        debug!("recorded {} walls at {cell}", walls.len());
        Ok(true)
    }

    /// Whether the cell has been visited.
    pub fn is_visited(&self, cell: Position) -> Result<bool, MazeError> {
        self.cell(cell).map(|record| record.is_visited())
    }

    /// Walls recorded for the cell, boundary walls included.
    pub fn walls(&self, cell: Position) -> Result<DirectionSet, MazeError> {
        self.cell(cell).map(|record| record.walls())
    }

    /// Sides traversed to or from the cell.
    pub fn directions_taken(&self, cell: Position) -> Result<DirectionSet, MazeError> {
        self.cell(cell).map(|record| record.directions_taken())
    }

    /// Complete record for the cell.
    pub fn cell(&self, cell: Position) -> Result<CellRecord, MazeError> {
        let index = self.index_of(cell)?;
        Ok(self.cells[index])
    }

    /// Whether the neighbour of the current cell in `direction` was visited.
    ///
    /// Fails with [`MazeError::OutOfBounds`] when the neighbour lies outside
    /// the grid.
    pub fn visited_neighbor(&self, direction: Direction) -> Result<bool, MazeError> {
        let from = self.pose.position();
        let target = from.neighbor(direction);
        let Some(index) = self.dimensions.index(target) else {
            warn!("attempted to look out of bounds from {from} at {target} facing {direction}");
            return Err(MazeError::OutOfBounds {
                from,
                target,
                direction,
            });
        };
        Ok(self.cells[index].is_visited())
    }

    /// Current coordinates of the robot.
    #[must_use]
    pub fn coordinates(&self) -> Position {
        self.pose.position()
    }

    /// Current column of the robot.
    #[must_use]
    pub fn x(&self) -> i32 {
        self.pose.position().x()
    }

    /// Current row of the robot.
    #[must_use]
    pub fn y(&self) -> i32 {
        self.pose.position().y()
    }

    /// Direction the robot's body faces.
    #[must_use]
    pub fn orientation(&self) -> Direction {
        self.pose.orientation()
    }

    /// Current pose.
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Size of the grid.
    #[must_use]
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Renderer receiving wall discoveries.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Consumes the store, yielding its renderer.
    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn index_of(&self, cell: Position) -> Result<usize, MazeError> {
        let dimensions = self.dimensions;
        dimensions
            .index(cell)
            .ok_or(MazeError::CellOutOfBounds { cell, dimensions })
    }

    fn seed_boundaries(&mut self) {
        let columns = i32::try_from(self.dimensions.columns()).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.dimensions.rows()).unwrap_or(i32::MAX);
        for y in 0..rows {
            for x in 0..columns {
                let cell = Position::new(x, y);
                if let Some(index) = self.dimensions.index(cell) {
                    self.cells[index] =
                        CellRecord::with_walls(self.dimensions.boundary_walls(cell));
                }
            }
        }
    }
}

/// Applies the provided command to the store, reporting what changed.
///
/// Errors leave the store untouched and emit no event.
pub fn apply<R: MapRenderer>(
    state: &mut MazeState<R>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), MazeError> {
    match command {
        Command::UpdateOrientation { orientation } => {
            let orientation = state.update_orientation(orientation);
            out_events.push(Event::OrientationChanged { orientation });
        }
        Command::UpdatePosition { step } => {
            let from = state.coordinates();
            let to = state.update_position(step);
            out_events.push(Event::PositionChanged { from, to });
        }
        Command::Reset { x, y, orientation } => {
            state.reset(x, y, orientation);
            out_events.push(Event::MazeReset { pose: state.pose() });
        }
        Command::SetVisited { x, y } => {
            let cell = Position::new(x, y);
            state.set_visited(cell)?;
            out_events.push(Event::CellVisited { cell });
        }
        Command::SetDirectionTaken { x, y, direction } => {
            let cell = Position::new(x, y);
            state.set_direction_taken(cell, direction)?;
            if let Some(direction) = Direction::from_raw(direction) {
                out_events.push(Event::DirectionTaken { cell, direction });
            }
        }
        Command::SetWalls { x, y, walls } => {
            let cell = Position::new(x, y);
            if state.set_walls(cell, walls)? {
                out_events.push(Event::WallsRecorded { cell, walls });
            } else {
                out_events.push(Event::WallsRejected { cell });
            }
        }
    }
    Ok(())
}
