#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map renderer that reveals discovered maze walls on a drawing surface.
//!
//! [`RevealMap`] implements [`MapRenderer`] by projecting wall segments into
//! pixel space and handing them to an opaque [`Surface`]. North is drawn at the
//! top of the surface, so row `rows - 1` of the maze lands on the first pixel
//! rows. [`Bitmap`] is an in-memory surface that prints as ASCII art.

use std::{error::Error, fmt};

use glam::UVec2;
use log::{debug, warn};
use maze_gps_core::{Direction, DirectionSet, GridDimensions, MapRenderer, Position};

/// Drawing target the reveal map writes to.
pub trait Surface {
    /// Blanks the surface and resizes it to `size` pixels.
    fn clear(&mut self, size: UVec2);

    /// Draws a straight line between two pixels, both inclusive.
    fn draw_line(&mut self, from: UVec2, to: UVec2);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn clear(&mut self, size: UVec2) {
        (**self).clear(size);
    }

    fn draw_line(&mut self, from: UVec2, to: UVec2) {
        (**self).draw_line(from, to);
    }
}

/// Placement of the maze grid on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapLayout {
    cell_length: u32,
    origin: UVec2,
}

impl MapLayout {
    /// Smallest cell edge that keeps opposite walls of a cell apart.
    pub const MIN_CELL_LENGTH: u32 = 2;

    /// Cell edge used when adapters do not configure one.
    pub const DEFAULT_CELL_LENGTH: u32 = 4;

    /// Creates a new layout descriptor.
    ///
    /// Returns an error when `cell_length` is below [`Self::MIN_CELL_LENGTH`].
    pub fn new(cell_length: u32, origin: UVec2) -> Result<Self, RenderingError> {
        if cell_length < Self::MIN_CELL_LENGTH {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            cell_length,
            origin,
        })
    }

    /// Length of a cell edge in pixels.
    #[must_use]
    pub const fn cell_length(&self) -> u32 {
        self.cell_length
    }

    /// Pixel holding the north-west corner of the grid.
    #[must_use]
    pub const fn origin(&self) -> UVec2 {
        self.origin
    }

    /// Surface size needed to show the whole grid.
    ///
    /// Returns [`RenderingError::SurfaceTooLarge`] when a pixel of the grid
    /// would lie beyond the `u32` range.
    pub fn surface_size(&self, dimensions: GridDimensions) -> Result<UVec2, RenderingError> {
        let width = self.extent(dimensions.columns(), self.origin.x);
        let height = self.extent(dimensions.rows(), self.origin.y);
        match (width, height) {
            (Some(width), Some(height)) => Ok(UVec2::new(width, height)),
            _ => Err(RenderingError::SurfaceTooLarge {
                dimensions,
                cell_length: self.cell_length,
            }),
        }
    }

    /// North-west corner of `cell`, or `None` outside the grid.
    #[must_use]
    pub fn cell_corner(&self, dimensions: GridDimensions, cell: Position) -> Option<UVec2> {
        if !dimensions.contains(cell) {
            return None;
        }

        let column = u32::try_from(cell.x()).ok()?;
        let row_from_top = dimensions.rows() - 1 - u32::try_from(cell.y()).ok()?;
        Some(UVec2::new(
            self.offset(column, self.origin.x)?,
            self.offset(row_from_top, self.origin.y)?,
        ))
    }

    /// Endpoints of the wall on `side` of `cell`.
    #[must_use]
    pub fn wall_segment(
        &self,
        dimensions: GridDimensions,
        cell: Position,
        side: Direction,
    ) -> Option<(UVec2, UVec2)> {
        let north_west = self.cell_corner(dimensions, cell)?;
        let east = north_west.x.checked_add(self.cell_length)?;
        let south = north_west.y.checked_add(self.cell_length)?;
        let north_east = UVec2::new(east, north_west.y);
        let south_west = UVec2::new(north_west.x, south);
        let south_east = UVec2::new(east, south);

        Some(match side {
            Direction::North => (north_west, north_east),
            Direction::East => (north_east, south_east),
            Direction::South => (south_west, south_east),
            Direction::West => (north_west, south_west),
        })
    }

    fn offset(&self, cells: u32, origin: u32) -> Option<u32> {
        cells.checked_mul(self.cell_length)?.checked_add(origin)
    }

    fn extent(&self, cells: u32, origin: u32) -> Option<u32> {
        self.offset(cells, origin)?.checked_add(1)
    }
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            cell_length: Self::DEFAULT_CELL_LENGTH,
            origin: UVec2::ZERO,
        }
    }
}

/// Visual projection of the discovered maze structure.
#[derive(Clone, Debug)]
pub struct RevealMap<S> {
    surface: S,
    layout: MapLayout,
    dimensions: Option<GridDimensions>,
    drawn: Vec<DirectionSet>,
}

impl<S: Surface> RevealMap<S> {
    /// Creates a reveal map drawing onto `surface`.
    ///
    /// Nothing is drawn until the first [`MapRenderer::reset`].
    #[must_use]
    pub fn new(surface: S, layout: MapLayout) -> Self {
        Self {
            surface,
            layout,
            dimensions: None,
            drawn: Vec::new(),
        }
    }

    /// Layout used for projection.
    #[must_use]
    pub fn layout(&self) -> MapLayout {
        self.layout
    }

    /// Surface receiving the drawing instructions.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consumes the map, yielding its surface.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Whether the wall on `side` of `cell` has been drawn since the last reset.
    #[must_use]
    pub fn is_drawn(&self, cell: Position, side: Direction) -> bool {
        self.dimensions
            .and_then(|dimensions| dimensions.index(cell))
            .and_then(|index| self.drawn.get(index))
            .is_some_and(|sides| sides.contains(side))
    }
}

impl<S: Surface> MapRenderer for RevealMap<S> {
    fn reset(&mut self, dimensions: GridDimensions) {
        self.drawn.clear();
        let size = match self.layout.surface_size(dimensions) {
            Ok(size) => size,
            Err(error) => {
                warn!("{error}; the map stays blank");
                self.dimensions = None;
                self.surface.clear(UVec2::ZERO);
                return;
            }
        };

        self.surface.clear(size);
        self.dimensions = Some(dimensions);
        self.drawn.resize(dimensions.cell_count(), DirectionSet::EMPTY);

        // Every post lies inside `size`, which was computed without overflow.
        let length = self.layout.cell_length();
        for row in 0..=dimensions.rows() {
            for column in 0..=dimensions.columns() {
                let post = self.layout.origin() + UVec2::new(column, row) * length;
                self.surface.draw_line(post, post);
            }
        }
    }

    fn draw_wall(&mut self, cell: Position, side: Direction) {
        let Some(dimensions) = self.dimensions else {
            debug!("wall at {cell} facing {side} has no map to draw on");
            return;
        };
        let (Some(index), Some((from, to))) = (
            dimensions.index(cell),
            self.layout.wall_segment(dimensions, cell, side),
        ) else {
            warn!("wall at {cell} facing {side} lies outside the {dimensions} map");
            return;
        };

        if self.drawn[index].contains(side) {
            return;
        }
        self.drawn[index].insert(side);
        self.surface.draw_line(from, to);
    }
}

/// Monochrome in-memory surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    size: UVec2,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Creates an empty bitmap; its size is set by [`Surface::clear`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size in pixels.
    #[must_use]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Whether the pixel is set. Pixels outside the bitmap are unset.
    #[must_use]
    pub fn is_set(&self, pixel: UVec2) -> bool {
        self.offset(pixel)
            .and_then(|offset| self.pixels.get(offset).copied())
            .unwrap_or(false)
    }

    fn set(&mut self, x: i64, y: i64) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(offset) = self.offset(UVec2::new(x, y)) {
            self.pixels[offset] = true;
        }
    }

    fn offset(&self, pixel: UVec2) -> Option<usize> {
        if pixel.x >= self.size.x || pixel.y >= self.size.y {
            return None;
        }
        let width = usize::try_from(self.size.x).ok()?;
        let row = usize::try_from(pixel.y).ok()?;
        let column = usize::try_from(pixel.x).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl Surface for Bitmap {
    fn clear(&mut self, size: UVec2) {
        self.pixels.clear();
        let count = usize::try_from(u64::from(size.x) * u64::from(size.y))
            .ok()
            .filter(|&count| self.pixels.try_reserve_exact(count).is_ok());
        let Some(count) = count else {
            warn!("bitmap of {size} pixels cannot be allocated; keeping it empty");
            self.size = UVec2::ZERO;
            return;
        };

        self.size = size;
        self.pixels.resize(count, false);
    }

    fn draw_line(&mut self, from: UVec2, to: UVec2) {
        if self.pixels.is_empty() {
            return;
        }

        // Bresenham in i64, wide enough for any pair of u32 endpoints.
        let (mut x, mut y) = (i64::from(from.x), i64::from(from.y));
        let (end_x, end_y) = (i64::from(to.x), i64::from(to.y));
        let (delta_x, delta_y) = ((end_x - x).abs(), (end_y - y).abs());
        let (step_x, step_y) = ((end_x - x).signum(), (end_y - y).signum());
        let mut error = delta_x - delta_y;

        loop {
            self.set(x, y);
            if x == end_x && y == end_y {
                break;
            }
            let doubled = 2 * error;
            if doubled > -delta_y {
                error -= delta_y;
                x += step_x;
            }
            if doubled < delta_x {
                error += delta_x;
                y += step_y;
            }
        }
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size.y {
            let line: String = (0..self.size.x)
                .map(|column| {
                    if self.is_set(UVec2::new(column, row)) {
                        '#'
                    } else {
                        ' '
                    }
                })
                .collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Cells must be large enough to keep opposite walls apart.
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: u32,
    },
    /// The grid needs pixel coordinates beyond the `u32` range.
    SurfaceTooLarge {
        /// Size of the grid that was projected.
        dimensions: GridDimensions,
        /// Cell length of the layout doing the projection.
        cell_length: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell_length must be at least {} (received {cell_length})",
                    MapLayout::MIN_CELL_LENGTH
                )
            }
            Self::SurfaceTooLarge {
                dimensions,
                cell_length,
            } => write!(
                f,
                "maze of {dimensions} does not fit on a surface with cell_length {cell_length}"
            ),
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimensions(rows: i32, columns: i32) -> GridDimensions {
        GridDimensions::try_new(rows, columns).expect("valid dimensions")
    }

    #[derive(Debug, Default)]
    struct LineLog {
        cleared: Vec<UVec2>,
        lines: Vec<(UVec2, UVec2)>,
    }

    impl Surface for LineLog {
        fn clear(&mut self, size: UVec2) {
            self.cleared.push(size);
            self.lines.clear();
        }

        fn draw_line(&mut self, from: UVec2, to: UVec2) {
            self.lines.push((from, to));
        }
    }

    #[test]
    fn layout_rejects_cells_too_small_to_separate_walls() {
        let error =
            MapLayout::new(1, UVec2::ZERO).expect_err("single pixel cells must be rejected");

        assert_eq!(error, RenderingError::InvalidCellLength { cell_length: 1 });
        assert_eq!(
            error.to_string(),
            "cell_length must be at least 2 (received 1)"
        );
    }

    #[test]
    fn wall_segments_place_north_at_the_top() {
        let layout = MapLayout::new(4, UVec2::new(1, 1)).expect("valid layout");
        let grid = dimensions(3, 2);

        assert_eq!(
            layout.wall_segment(grid, Position::new(0, 2), Direction::North),
            Some((UVec2::new(1, 1), UVec2::new(5, 1)))
        );
        assert_eq!(
            layout.wall_segment(grid, Position::new(1, 0), Direction::East),
            Some((UVec2::new(9, 9), UVec2::new(9, 13)))
        );
        assert_eq!(
            layout.wall_segment(grid, Position::new(2, 0), Direction::West),
            None
        );
        assert_eq!(layout.surface_size(grid), Ok(UVec2::new(10, 14)));
    }

    #[test]
    fn oversized_layout_is_reported_instead_of_overflowing() {
        let layout = MapLayout::new(3_000_000_000, UVec2::new(7, 7)).expect("valid layout");
        let grid = dimensions(2, 2);

        let error = layout.surface_size(grid).expect_err("6e9 pixels overflow u32");
        assert_eq!(
            error,
            RenderingError::SurfaceTooLarge {
                dimensions: grid,
                cell_length: 3_000_000_000,
            }
        );
        assert_eq!(
            error.to_string(),
            "maze of 2 rows x 2 columns does not fit on a surface with cell_length 3000000000"
        );
        assert_eq!(
            layout.wall_segment(grid, Position::new(1, 0), Direction::East),
            None
        );
        assert_eq!(
            layout.cell_corner(grid, Position::new(0, 1)),
            Some(UVec2::new(7, 7))
        );
    }

    #[test]
    fn reset_with_oversized_layout_leaves_surface_blank() {
        let layout = MapLayout::new(u32::MAX, UVec2::ZERO).expect("valid layout");
        let mut map = RevealMap::new(LineLog::default(), layout);

        map.reset(dimensions(3, 3));
        map.draw_wall(Position::new(0, 0), Direction::North);

        assert_eq!(map.surface().cleared, vec![UVec2::ZERO]);
        assert!(map.surface().lines.is_empty());
        assert!(!map.is_drawn(Position::new(0, 0), Direction::North));
    }

    #[test]
    fn reset_clears_surface_and_draws_corner_posts() {
        let mut map = RevealMap::new(LineLog::default(), MapLayout::default());

        map.reset(dimensions(1, 2));

        let surface = map.surface();
        assert_eq!(surface.cleared, vec![UVec2::new(9, 5)]);
        assert_eq!(surface.lines.len(), 6);
        assert!(surface.lines.iter().all(|(from, to)| from == to));
    }

    #[test]
    fn draw_wall_is_idempotent() {
        let mut map = RevealMap::new(LineLog::default(), MapLayout::default());
        map.reset(dimensions(2, 2));
        let posts = map.surface().lines.len();

        map.draw_wall(Position::new(0, 0), Direction::East);
        map.draw_wall(Position::new(0, 0), Direction::East);

        assert_eq!(map.surface().lines.len(), posts + 1);
        assert!(map.is_drawn(Position::new(0, 0), Direction::East));
        assert!(!map.is_drawn(Position::new(0, 0), Direction::North));
    }

    #[test]
    fn draw_wall_ignores_cells_outside_the_map() {
        let mut map = RevealMap::new(LineLog::default(), MapLayout::default());
        map.draw_wall(Position::new(0, 0), Direction::North);
        assert!(map.surface().lines.is_empty());

        map.reset(dimensions(2, 2));
        let posts = map.surface().lines.len();
        map.draw_wall(Position::new(2, 0), Direction::North);
        map.draw_wall(Position::new(0, -1), Direction::North);

        assert_eq!(map.surface().lines.len(), posts);
    }

    #[test]
    fn reset_forgets_drawn_walls() {
        let mut map = RevealMap::new(LineLog::default(), MapLayout::default());
        map.reset(dimensions(2, 2));
        map.draw_wall(Position::new(1, 1), Direction::South);

        map.reset(dimensions(2, 2));

        assert!(!map.is_drawn(Position::new(1, 1), Direction::South));
    }

    #[test]
    fn bitmap_draws_axis_aligned_and_diagonal_lines() {
        let mut bitmap = Bitmap::new();
        bitmap.clear(UVec2::new(4, 4));

        bitmap.draw_line(UVec2::new(0, 0), UVec2::new(3, 0));
        bitmap.draw_line(UVec2::new(3, 3), UVec2::new(1, 1));

        assert_eq!(bitmap.to_string(), "####\n #\n  #\n   #\n");
    }

    #[test]
    fn bitmap_ignores_pixels_outside_bounds() {
        let mut bitmap = Bitmap::new();
        bitmap.clear(UVec2::new(2, 1));

        bitmap.draw_line(UVec2::new(1, 0), UVec2::new(5, 0));

        assert!(bitmap.is_set(UVec2::new(1, 0)));
        assert!(!bitmap.is_set(UVec2::new(0, 0)));
        assert!(!bitmap.is_set(UVec2::new(5, 0)));
    }

    #[test]
    fn bitmap_stays_empty_when_pixels_cannot_be_allocated() {
        let mut bitmap = Bitmap::new();

        bitmap.clear(UVec2::splat(u32::MAX));
        bitmap.draw_line(UVec2::ZERO, UVec2::new(u32::MAX, u32::MAX));

        assert_eq!(bitmap.size(), UVec2::ZERO);
        assert!(!bitmap.is_set(UVec2::ZERO));
        assert_eq!(bitmap.to_string(), "");
    }
}
