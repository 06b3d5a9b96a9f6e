use crate::config::CellSymbols;

use rand::Rng;
use smallvec::SmallVec;

pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// Stable index in `0..4`, used for per direction lookup tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }

    /// Is this direction along the x axis.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        self == CompassPrimary::East || self == CompassPrimary::West
    }

    pub fn rand_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        CompassPrimary::ALL[rng.gen_range(0..CompassPrimary::ALL.len())]
    }

    /// Single letter used when rendering the walk directions of a maze for debugging.
    pub fn marker(self) -> char {
        match self {
            CompassPrimary::North => 'N',
            CompassPrimary::East => 'E',
            CompassPrimary::South => 'S',
            CompassPrimary::West => 'W',
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellType {
    /// Not yet part of the maze, renders as wall.
    Empty,
    /// Part of the connected passages.
    Open,
    /// Reserved and never walked through, e.g. space for decoration.
    Closed,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    cell_type: CellType,
    open: [bool; 4],
    exit_dir: Option<CompassPrimary>,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::new(CellType::Empty)
    }
}

impl Cell {
    pub fn new(cell_type: CellType) -> Cell {
        Cell {
            cell_type,
            open: [false; 4],
            exit_dir: None,
        }
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.cell_type == CellType::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.cell_type == CellType::Closed
    }

    /// Is there a passage across the edge of this cell in the given direction.
    #[inline]
    pub fn is_open_towards(&self, direction: CompassPrimary) -> bool {
        self.open[direction.index()]
    }

    pub fn open_directions(&self) -> DirectionSmallVec {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .filter(|dir| self.is_open_towards(*dir))
            .collect()
    }

    /// Direction the generating walk last left this cell by.
    #[inline]
    pub fn exit_dir(&self) -> Option<CompassPrimary> {
        self.exit_dir
    }

    pub(crate) fn set_type(&mut self, cell_type: CellType) {
        self.cell_type = cell_type;
    }

    pub(crate) fn set_exit_dir(&mut self, direction: CompassPrimary) {
        self.exit_dir = Some(direction);
    }

    /// Drop the passage towards `direction`. Only for edges whose other side no longer exists.
    pub(crate) fn seal(&mut self, direction: CompassPrimary) {
        self.open[direction.index()] = false;
    }

    pub fn render(&self, symbols: &CellSymbols, debug_directions: bool) -> char {
        match self.cell_type {
            CellType::Open => match self.exit_dir {
                Some(dir) if debug_directions => dir.marker(),
                _ => symbols.path,
            },
            CellType::Closed => symbols.closed,
            CellType::Empty => symbols.wall,
        }
    }
}

/// Carve a passage between two adjacent cells, `second` being in `direction` from `first`.
///
/// This is the only way the open flags are set, so both sides of an edge always agree.
/// `Cell::seal` clears a flag once the cell across the edge is gone.
pub fn link(first: &mut Cell, second: &mut Cell, direction: CompassPrimary) {
    first.open[direction.index()] = true;
    second.open[direction.opposite().index()] = true;
}
