//! Explicit grid encodings of generated mazes.
//!
//! A dense block only knows about passages through the open flags of its cells. Undensifying
//! gives every cell and every gap between two cells its own tile, so a consumer can treat each
//! tile independently as wall, path or closed space.

use crate::cells::{Cell, CellType, CompassPrimary};
use crate::config::CellSymbols;

use itertools::Itertools;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Tile {
    Wall,
    Closed,
    Path,
    /// An open cell that remembers the direction its generating walk left by.
    Walk(CompassPrimary),
}

impl Tile {
    pub fn from_cell(cell: &Cell) -> Tile {
        match cell.cell_type() {
            CellType::Open => cell.exit_dir().map_or(Tile::Path, Tile::Walk),
            CellType::Closed => Tile::Closed,
            CellType::Empty => Tile::Wall,
        }
    }

    /// Can something move through this tile.
    #[inline]
    pub fn is_traversable(self) -> bool {
        match self {
            Tile::Path | Tile::Walk(_) => true,
            Tile::Wall | Tile::Closed => false,
        }
    }

    pub fn symbol(self, symbols: &CellSymbols, debug_directions: bool) -> char {
        match self {
            Tile::Wall => symbols.wall,
            Tile::Closed => symbols.closed,
            Tile::Path => symbols.path,
            Tile::Walk(dir) => if debug_directions { dir.marker() } else { symbols.path },
        }
    }
}

/// A rectangular, row major grid of tiles.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct TileGrid {
    rows: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> TileGrid {
        debug_assert!(rows.iter().map(|row| row.len()).all_equal());
        TileGrid { rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        self.rows.get(y).and_then(|row| row.get(x)).cloned()
    }

    /// Surround the grid with a one tile thick wall.
    pub fn framed(&self) -> TileGrid {
        let framed_width = self.width() + 2;
        let mut rows = Vec::with_capacity(self.height() + 2);
        rows.push(vec![Tile::Wall; framed_width]);
        for row in &self.rows {
            let mut framed_row = Vec::with_capacity(framed_width);
            framed_row.push(Tile::Wall);
            framed_row.extend_from_slice(row);
            framed_row.push(Tile::Wall);
            rows.push(framed_row);
        }
        rows.push(vec![Tile::Wall; framed_width]);
        TileGrid { rows }
    }

    pub fn to_text(&self,
                   symbols: &CellSymbols,
                   debug_directions: bool,
                   include_new_lines: bool)
                   -> String {
        let separator = if include_new_lines { "\n" } else { "" };
        let mut text = self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| tile.symbol(symbols, debug_directions))
                    .collect::<String>()
            })
            .join(separator);
        text.push_str(separator);
        text
    }

    /// `true` marks an obstacle (wall or closed space), `false` something that can be walked on.
    pub fn to_obstacles(&self) -> Vec<Vec<bool>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|tile| !tile.is_traversable()).collect())
            .collect()
    }

    pub fn traversable_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.is_traversable())
            .count()
    }
}

/// Tile for the gap between two horizontally or vertically adjacent cells.
///
/// `open` says whether a passage was carved across the gap.
pub fn gap_tile(open: bool, first: &Cell, second: &Cell) -> Tile {
    if open {
        Tile::Path
    } else if first.is_closed() && second.is_closed() {
        Tile::Closed
    } else {
        Tile::Wall
    }
}

/// Tile for the corner point shared by four cells.
pub fn corner_tile(surrounding: [&Cell; 4]) -> Tile {
    if surrounding.iter().all(|cell| cell.is_closed()) {
        Tile::Closed
    } else {
        Tile::Wall
    }
}

/// Expand a dense `width * height` row major cell grid to `(2 * width - 1) * (2 * height - 1)` tiles.
pub fn undensify(cells: &[Cell], width: usize, height: usize) -> TileGrid {
    debug_assert_eq!(cells.len(), width * height);
    let cell_at = |x: usize, y: usize| &cells[y * width + x];

    let mut rows = Vec::with_capacity(2 * height - 1);
    for y in 0..height {
        let mut cell_row = Vec::with_capacity(2 * width - 1);
        for x in 0..width {
            let cell = cell_at(x, y);
            cell_row.push(Tile::from_cell(cell));
            if x + 1 < width {
                cell_row.push(gap_tile(cell.is_open_towards(CompassPrimary::East),
                                       cell,
                                       cell_at(x + 1, y)));
            }
        }
        rows.push(cell_row);

        if y + 1 < height {
            let mut gap_row = Vec::with_capacity(2 * width - 1);
            for x in 0..width {
                let cell = cell_at(x, y);
                let below = cell_at(x, y + 1);
                gap_row.push(gap_tile(cell.is_open_towards(CompassPrimary::South), cell, below));
                if x + 1 < width {
                    gap_row.push(corner_tile([cell,
                                              cell_at(x + 1, y),
                                              below,
                                              cell_at(x + 1, y + 1)]));
                }
            }
            rows.push(gap_row);
        }
    }
    TileGrid::from_rows(rows)
}

/// The cells written out one tile each, without any gaps.
pub fn dense(cells: &[Cell], width: usize) -> TileGrid {
    TileGrid::from_rows(cells.chunks(width)
        .map(|row| row.iter().map(Tile::from_cell).collect())
        .collect())
}
