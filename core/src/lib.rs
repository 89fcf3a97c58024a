#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze GPS workspace.
//!
//! This crate defines the vocabulary that connects the decision logic, the
//! authoritative maze state store, and the map renderer. Callers describe
//! mutations as [`Command`] values or direct store calls, the store records
//! pose and discovered structure, and every accepted mutation is reported back
//! as an [`Event`]. Wall discoveries are forwarded to a [`MapRenderer`] so the
//! store never depends on a concrete drawing surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute cardinal directions encoded as `0..4`.
///
/// The mapping is fixed for the lifetime of a run: North is always `0`
/// regardless of the robot's physical heading. North points toward increasing
/// `y`, East toward increasing `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing `y`.
    North = 0,
    /// Toward increasing `x`.
    East = 1,
    /// Toward decreasing `y`.
    South = 2,
    /// Toward decreasing `x`.
    West = 3,
}

impl Direction {
    /// Every direction in encoding order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Normalizes any integer into a direction using `((v % 4) + 4) % 4`.
    #[must_use]
    pub const fn normalized(value: i32) -> Self {
        match value.rem_euclid(4) {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Decodes a raw direction, returning `None` outside `0..4`.
    #[must_use]
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::North),
            1 => Some(Self::East),
            2 => Some(Self::South),
            3 => Some(Self::West),
            _ => None,
        }
    }

    /// Integer encoding of the direction.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction reached after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Direction reached after a quarter turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Unit offset `(dx, dy)` of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        f.write_str(name)
    }
}

/// Location of a maze cell. `x` selects the column and `y` the row.
///
/// Coordinates are signed because the pose is allowed to wander past the grid
/// edges; only operations that address a cell check the bounds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position reached after moving `step` cells along `direction`.
    ///
    /// Negative steps move backward. Coordinates wrap at the `i32` limits, so
    /// stepping back by the same amount always returns to the start.
    #[must_use]
    pub const fn stepped(self, direction: Direction, step: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.wrapping_add(dx.wrapping_mul(step)),
            y: self.y.wrapping_add(dy.wrapping_mul(step)),
        }
    }

    /// Adjacent position in `direction`.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        self.stepped(direction, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Robot position plus absolute orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    position: Position,
    orientation: Direction,
}

impl Pose {
    /// Creates a new pose.
    #[must_use]
    pub const fn new(position: Position, orientation: Direction) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Cell the robot occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Direction the robot's body faces.
    #[must_use]
    pub const fn orientation(&self) -> Direction {
        self.orientation
    }
}

/// Validated maze size. Both dimensions are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    rows: u32,
    columns: u32,
}

impl GridDimensions {
    /// Validates raw dimensions supplied by the embedding program.
    ///
    /// Returns [`MazeError::InvalidDimension`] when either value is not positive.
    pub fn try_new(rows: i32, columns: i32) -> Result<Self, MazeError> {
        match (u32::try_from(rows), u32::try_from(columns)) {
            (Ok(row_count), Ok(column_count)) if row_count > 0 && column_count > 0 => Ok(Self {
                rows: row_count,
                columns: column_count,
            }),
            _ => Err(MazeError::InvalidDimension { rows, columns }),
        }
    }

    /// Number of rows (extent along `y`).
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns (extent along `x`).
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.rows) * u64::from(self.columns);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the position addresses a cell inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Row-major offset of the cell, or `None` outside the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Boundary walls a cell carries before any discovery happens.
    #[must_use]
    pub fn boundary_walls(&self, position: Position) -> DirectionSet {
        let mut walls = DirectionSet::EMPTY;
        if !self.contains(position) {
            return walls;
        }

        if position.x() == 0 {
            walls.insert(Direction::West);
        }
        if position.y() == 0 {
            walls.insert(Direction::South);
        }
        if i64::from(position.x()) == i64::from(self.columns) - 1 {
            walls.insert(Direction::East);
        }
        if i64::from(position.y()) == i64::from(self.rows) - 1 {
            walls.insert(Direction::North);
        }
        walls
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows x {} columns", self.rows, self.columns)
    }
}

/// Byte-sized set of directions, one bit per [`Direction`] index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// Set containing no direction.
    pub const EMPTY: Self = Self(0);

    /// Set containing all four directions.
    pub const ALL: Self = Self(0b1111);

    /// Rebuilds a set from its bit representation, ignoring bits above `0b1111`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Bit representation where bit `n` stands for direction index `n`.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns a copy of the set with `direction` added.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | (1 << direction.index()))
    }

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Direction) {
        *self = self.with(direction);
    }

    /// Adds every direction of `other` to the set.
    pub fn extend_from(&mut self, other: DirectionSet) {
        self.0 |= other.0;
    }

    /// Reports whether the set contains `direction`.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the contained directions in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |set, direction| set.with(direction))
    }
}

impl From<Vec<Direction>> for DirectionSet {
    fn from(directions: Vec<Direction>) -> Self {
        directions.into_iter().collect()
    }
}

impl From<DirectionSet> for Vec<Direction> {
    fn from(set: DirectionSet) -> Self {
        set.iter().collect()
    }
}

/// Everything known about a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellRecord {
    walls: DirectionSet,
    taken: DirectionSet,
    visited: bool,
}

impl CellRecord {
    /// Record carrying only the provided walls.
    #[must_use]
    pub const fn with_walls(walls: DirectionSet) -> Self {
        Self {
            walls,
            taken: DirectionSet::EMPTY,
            visited: false,
        }
    }

    /// Sides of the cell known to hold a wall.
    #[must_use]
    pub const fn walls(&self) -> DirectionSet {
        self.walls
    }

    /// Sides the robot traversed to or from this cell.
    #[must_use]
    pub const fn directions_taken(&self) -> DirectionSet {
        self.taken
    }

    /// Whether the robot has occupied and left this cell.
    #[must_use]
    pub const fn is_visited(&self) -> bool {
        self.visited
    }

    /// Adds walls to the record.
    pub fn add_walls(&mut self, walls: DirectionSet) {
        self.walls.extend_from(walls);
    }

    /// Records a traversal through `direction`.
    pub fn mark_taken(&mut self, direction: Direction) {
        self.taken.insert(direction);
    }

    /// Flags the cell as visited, freezing its wall data.
    pub fn mark_visited(&mut self) {
        self.visited = true;
    }
}

/// Drawing capability the maze state store forwards discoveries to.
///
/// Implementations must treat [`MapRenderer::draw_wall`] as idempotent.
pub trait MapRenderer {
    /// Clears the surface to a blank grid of the provided size.
    fn reset(&mut self, dimensions: GridDimensions);

    /// Draws the wall on `side` of `cell`.
    fn draw_wall(&mut self, cell: Position, side: Direction);
}

impl<R: MapRenderer + ?Sized> MapRenderer for &mut R {
    fn reset(&mut self, dimensions: GridDimensions) {
        (**self).reset(dimensions);
    }

    fn draw_wall(&mut self, cell: Position, side: Direction) {
        (**self).draw_wall(cell, side);
    }
}

impl<R: MapRenderer + ?Sized> MapRenderer for Box<R> {
    fn reset(&mut self, dimensions: GridDimensions) {
        (**self).reset(dimensions);
    }

    fn draw_wall(&mut self, cell: Position, side: Direction) {
        (**self).draw_wall(cell, side);
    }
}

/// Renderer that discards every instruction, for headless runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullRenderer;

impl MapRenderer for NullRenderer {
    fn reset(&mut self, _dimensions: GridDimensions) {}

    fn draw_wall(&mut self, _cell: Position, _side: Direction) {}
}

/// Commands that express all permissible store mutations.
///
/// Integer orientations and directions are carried raw so the store applies
/// its own normalization rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Stores a new orientation, normalized modulo four.
    UpdateOrientation {
        /// Raw orientation value.
        orientation: i32,
    },
    /// Moves the pose along its current orientation.
    UpdatePosition {
        /// Number of cells traversed; negative values move backward.
        step: i32,
    },
    /// Clears all discovered structure and places the robot anew.
    Reset {
        /// New starting column.
        x: i32,
        /// New starting row.
        y: i32,
        /// New raw starting orientation.
        orientation: i32,
    },
    /// Marks a cell visited.
    SetVisited {
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
    },
    /// Records a traversal side for a cell.
    SetDirectionTaken {
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
        /// Raw direction; values outside `0..4` are ignored.
        direction: i32,
    },
    /// Records the wall layout discovered for a cell.
    SetWalls {
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
        /// Sides holding a wall.
        walls: DirectionSet,
    },
}

/// Events broadcast by the store after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The orientation was replaced.
    OrientationChanged {
        /// Normalized orientation now in effect.
        orientation: Direction,
    },
    /// The pose moved.
    PositionChanged {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// All discovered structure was cleared.
    MazeReset {
        /// Pose assigned by the reset.
        pose: Pose,
    },
    /// A cell was marked visited.
    CellVisited {
        /// Cell that was marked.
        cell: Position,
    },
    /// A traversal side was recorded.
    DirectionTaken {
        /// Cell the traversal belongs to.
        cell: Position,
        /// Side that was traversed.
        direction: Direction,
    },
    /// Walls were recorded for an unvisited cell.
    WallsRecorded {
        /// Cell the walls belong to.
        cell: Position,
        /// Walls supplied by the caller.
        walls: DirectionSet,
    },
    /// A wall update was refused because the cell is already visited.
    WallsRejected {
        /// Cell whose wall data is frozen.
        cell: Position,
    },
}

/// Failures reported by the maze state store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    /// A neighbour lookup would leave the grid.
    #[error(
        "attempted to look out of bounds standing at {from} looking at {target} facing {direction}"
    )]
    OutOfBounds {
        /// Position of the robot when the lookup was made.
        from: Position,
        /// Neighbour position that fell outside the grid.
        target: Position,
        /// Direction of the lookup.
        direction: Direction,
    },
    /// A cell coordinate lies outside the grid.
    #[error("cell {cell} lies outside the maze of {dimensions}")]
    CellOutOfBounds {
        /// Offending coordinate.
        cell: Position,
        /// Size of the grid.
        dimensions: GridDimensions,
    },
    /// Grid dimensions were not positive.
    #[error("maze dimensions must be positive (received {rows} rows x {columns} columns)")]
    InvalidDimension {
        /// Requested number of rows.
        rows: i32,
        /// Requested number of columns.
        columns: i32,
    },
    /// The grid holds more cells than can be allocated.
    #[error("maze of {dimensions} is too large to allocate")]
    GridTooLarge {
        /// Size of the grid that could not be allocated.
        dimensions: GridDimensions,
    },
}
