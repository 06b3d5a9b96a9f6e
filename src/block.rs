//! A single rectangular maze tile and its generator.
//!
//! Generation uses Wilson's algorithm: repeated loop-erased random walks from cells outside the
//! maze until they hit the maze, each walk then being carved into the maze.
//! https://en.wikipedia.org/wiki/Maze_generation_algorithm#Wilson's_algorithm
//!
//! A block may be told that some of its edges border already generated blocks. A walk that steps
//! off such an edge has reached the maze just as if it hit one of this block's own maze cells.
//! The block reports those steps as `BorderCrossing`s; connecting the two blocks' cells is left to
//! the owner of both blocks.

use bit_set::BitSet;
use log::{debug, trace, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::arena::BlockId;
use crate::cells::{self, Cell, CellType, CompassPrimary, DirectionSmallVec};
use crate::config::{self, CellSymbols};
use crate::encoding::{self, TileGrid};
use crate::errors::*;
use crate::units::{ColumnIndex, EdgeOffset, Height, RowIndex, Width};
use crate::utils::MazeRng;

/// Blocks with fewer cells than this get a single closed cell instead of a 2x2 closed square.
pub const SMALL_BLOCK_AREA: usize = 25;

/// Which edges of a block lead into a neighbouring maze, and where along those edges a walk may
/// enter it.
#[derive(Clone, Debug, Default)]
pub struct Borders {
    sides: [Option<BitSet>; 4],
}

impl Borders {
    pub fn none() -> Borders {
        Borders::default()
    }

    /// Border the `direction` edge. `enterable` gives, for each position along the edge, whether
    /// the neighbouring cell across it may be walked into.
    pub fn with_side<I>(mut self, direction: CompassPrimary, enterable: I) -> Borders
        where I: IntoIterator<Item = bool>
    {
        let positions = enterable.into_iter()
            .enumerate()
            .filter(|&(_, can_enter)| can_enter)
            .map(|(offset, _)| offset)
            .collect::<BitSet>();
        self.sides[direction.index()] = Some(positions);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sides.iter().all(|side| side.is_none())
    }

    #[inline]
    pub fn has_side(&self, direction: CompassPrimary) -> bool {
        self.sides[direction.index()].is_some()
    }

    #[inline]
    pub fn can_exit(&self, direction: CompassPrimary, offset: EdgeOffset) -> bool {
        self.sides[direction.index()]
            .as_ref()
            .map_or(false, |positions| positions.contains(offset.0))
    }
}

/// A committed walk left the block from `cell` through its `direction` edge.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct BorderCrossing {
    pub cell: usize,
    pub direction: CompassPrimary,
    pub offset: EdgeOffset,
}

#[derive(Clone, Debug)]
pub struct Block {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    visited: BitSet,
    closed_count: usize,
    neighbours: [Option<BlockId>; 4],
    symbols: CellSymbols,
    debug_directions: bool,
}

impl Block {
    pub fn new(width: Width, height: Height) -> Result<Block> {
        config::validate_dimensions(width, height)?;
        let size = width.0 * height.0;
        Ok(Block {
            width: width.0,
            height: height.0,
            cells: vec![Cell::default(); size],
            visited: BitSet::with_capacity(size),
            closed_count: 0,
            neighbours: [None; 4],
            symbols: CellSymbols::default(),
            debug_directions: false,
        })
    }

    /// A new block with a closed area reserved before generation.
    pub fn with_closed_spaces(width: Width, height: Height, rng: &mut MazeRng) -> Result<Block> {
        let mut block = Block::new(width, height)?;
        block.insert_closed_spaces(rng);
        Ok(block)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, column: ColumnIndex, row: RowIndex) -> Option<&Cell> {
        self.cell_index(column, row).map(|index| &self.cells[index])
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    pub fn cell_index(&self, column: ColumnIndex, row: RowIndex) -> Option<usize> {
        let (ColumnIndex(x), RowIndex(y)) = (column, row);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn coordinates(&self, index: usize) -> (ColumnIndex, RowIndex) {
        (ColumnIndex(index % self.width), RowIndex(index / self.width))
    }

    #[inline]
    pub fn closed_count(&self) -> usize {
        self.closed_count
    }

    #[inline]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Every cell is either in the maze or reserved.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.visited.len() + self.closed_count == self.size()
    }

    #[inline]
    pub fn neighbour(&self, direction: CompassPrimary) -> Option<BlockId> {
        self.neighbours[direction.index()]
    }

    pub fn set_neighbour(&mut self, direction: CompassPrimary, neighbour: Option<BlockId>) {
        self.neighbours[direction.index()] = neighbour;
    }

    #[inline]
    pub fn symbols(&self) -> &CellSymbols {
        &self.symbols
    }

    pub fn set_symbols(&mut self, symbols: CellSymbols) {
        self.symbols = symbols;
    }

    pub fn set_debug_directions(&mut self, on: bool) {
        self.debug_directions = on;
    }

    /// Number of cells along the `direction` edge.
    #[inline]
    pub fn edge_length(&self, direction: CompassPrimary) -> usize {
        if direction.is_horizontal() { self.height } else { self.width }
    }

    /// Index of the cell at `offset` along this block's `direction` edge.
    pub fn border_cell_index(&self, direction: CompassPrimary, offset: EdgeOffset) -> usize {
        let EdgeOffset(n) = offset;
        debug_assert!(n < self.edge_length(direction));
        match direction {
            CompassPrimary::North => n,
            CompassPrimary::South => (self.height - 1) * self.width + n,
            CompassPrimary::West => n * self.width,
            CompassPrimary::East => n * self.width + self.width - 1,
        }
    }

    /// Position of a cell along the edge facing `direction`, whether or not it is on that edge.
    #[inline]
    pub fn edge_offset(&self, index: usize, direction: CompassPrimary) -> EdgeOffset {
        let (ColumnIndex(x), RowIndex(y)) = self.coordinates(index);
        if direction.is_horizontal() { EdgeOffset(y) } else { EdgeOffset(x) }
    }

    /// Positions along the `direction` edge where a neighbouring walk may step into this block.
    pub fn enterable_border(&self, direction: CompassPrimary) -> Vec<bool> {
        (0..self.edge_length(direction))
            .map(|n| !self.cells[self.border_cell_index(direction, EdgeOffset(n))].is_closed())
            .collect()
    }

    /// Index of the adjacent cell inside this block, None when stepping off the block.
    pub fn neighbour_index(&self, index: usize, direction: CompassPrimary) -> Option<usize> {
        let (ColumnIndex(x), RowIndex(y)) = self.coordinates(index);
        match direction {
            CompassPrimary::North if y > 0 => Some(index - self.width),
            CompassPrimary::South if y + 1 < self.height => Some(index + self.width),
            CompassPrimary::West if x > 0 => Some(index - 1),
            CompassPrimary::East if x + 1 < self.width => Some(index + 1),
            _ => None,
        }
    }

    /// Pairs of linked cells inside this block, each passage reported once.
    pub fn links(&self) -> Vec<(usize, usize)> {
        let mut links = Vec::new();
        for (index, cell) in self.cells.iter().enumerate() {
            for &dir in &[CompassPrimary::East, CompassPrimary::South] {
                if cell.is_open_towards(dir) {
                    if let Some(neighbour) = self.neighbour_index(index, dir) {
                        links.push((index, neighbour));
                    }
                }
            }
        }
        links
    }

    pub fn links_count(&self) -> usize {
        self.links().len()
    }

    /// Reserve a closed area: one cell in small blocks, otherwise a 2x2 square.
    ///
    /// A placement is only used if the free cells stay connected and every edge keeps at least one
    /// free cell. Blocks too narrow for any square placement get a single cell instead, and blocks
    /// where no single cell fits either (1x1, one cell wide strips) stay without closed space.
    /// Returns whether anything was reserved.
    pub fn insert_closed_spaces(&mut self, rng: &mut MazeRng) -> bool {
        let square = self.size() >= SMALL_BLOCK_AREA && self.width >= 2 && self.height >= 2;
        if square && self.reserve_region(rng, true) {
            return true;
        }
        if self.reserve_region(rng, false) {
            return true;
        }
        warn!("no closed space fits a {}x{} block", self.width, self.height);
        false
    }

    fn reserve_region(&mut self, rng: &mut MazeRng, square: bool) -> bool {
        let mut anchors = (0..self.size())
            .filter(|&index| self.cells[index].cell_type() == CellType::Empty)
            .filter(|&index| {
                let (ColumnIndex(x), RowIndex(y)) = self.coordinates(index);
                !square || (x + 1 < self.width && y + 1 < self.height)
            })
            .collect::<Vec<usize>>();
        anchors.shuffle(rng);

        for anchor in anchors {
            let region = if square {
                vec![anchor, anchor + 1, anchor + self.width, anchor + self.width + 1]
            } else {
                vec![anchor]
            };
            if region.iter().any(|&index| self.cells[index].cell_type() != CellType::Empty) {
                continue;
            }
            if self.free_components(&region).len() <= 1 && !self.closes_an_edge(&region) {
                for &index in &region {
                    self.cells[index].set_type(CellType::Closed);
                }
                self.closed_count += region.len();
                trace!("reserved closed cells {:?}", region);
                return true;
            }
        }
        false
    }

    /// Whether closing `region` would leave some edge with no free cell at all.
    fn closes_an_edge(&self, region: &[usize]) -> bool {
        CompassPrimary::ALL.iter().any(|&dir| {
            (0..self.edge_length(dir)).all(|n| {
                let index = self.border_cell_index(dir, EdgeOffset(n));
                self.cells[index].is_closed() || region.contains(&index)
            })
        })
    }

    /// Clear the passage flags of every cell along the `direction` edge. Returns how many were set.
    pub(crate) fn seal_edge(&mut self, direction: CompassPrimary) -> usize {
        let mut sealed = 0;
        for n in 0..self.edge_length(direction) {
            let index = self.border_cell_index(direction, EdgeOffset(n));
            if self.cells[index].is_open_towards(direction) {
                self.cells[index].seal(direction);
                sealed += 1;
            }
        }
        sealed
    }

    /// Link `index` to the adjacent cell in `direction` inside this block.
    pub(crate) fn carve(&mut self, index: usize, direction: CompassPrimary) {
        let next = self.neighbour_index(index, direction)
            .expect("carving stays inside the block");
        self.link_cells(index, next, direction);
    }

    /// Fill every free cell into the maze.
    ///
    /// Walks may leave the block through any edge given in `borders`; each such exit is returned
    /// and must be connected to the neighbouring block by the caller.
    pub fn generate(&mut self, borders: &Borders, rng: &mut MazeRng) -> Result<Vec<BorderCrossing>> {
        let mut crossings = Vec::new();
        if self.is_generated() {
            return Ok(crossings);
        }

        let unreachable = self.unreachable_cells(borders);
        if unreachable > 0 {
            bail!(ErrorKind::UnreachableCells(unreachable));
        }

        if borders.is_empty() {
            let seed = self.random_empty_cell(rng);
            self.add_to_maze(seed);
        }

        let mut walks = 0;
        while !self.is_generated() {
            if let Some(crossing) = self.random_walk(borders, rng)? {
                trace!("walk {} crossed the {:?} border at {:?}", walks, crossing.direction, crossing.offset);
                crossings.push(crossing);
            }
            walks += 1;
        }

        debug!("generated {}x{} block with {} walks, {} closed cells and {} border crossings",
               self.width, self.height, walks, self.closed_count, crossings.len());
        Ok(crossings)
    }

    pub fn to_tiles(&self, undensify: bool) -> Result<TileGrid> {
        if !self.is_generated() {
            bail!(ErrorKind::NotGenerated);
        }
        Ok(if undensify {
            encoding::undensify(&self.cells, self.width, self.height)
        } else {
            encoding::dense(&self.cells, self.width)
        })
    }

    pub fn to_text(&self, undensify: bool, include_new_lines: bool) -> Result<String> {
        Ok(self.to_tiles(undensify)?
            .to_text(&self.symbols, self.debug_directions, include_new_lines))
    }

    /// Undensified obstacle map, `true` for walls and closed spaces.
    pub fn to_bool_grid(&self) -> Result<Vec<Vec<bool>>> {
        Ok(self.to_tiles(true)?.to_obstacles())
    }

    fn add_to_maze(&mut self, index: usize) {
        self.cells[index].set_type(CellType::Open);
        let _ = self.visited.insert(index);
    }

    /// Carve a passage between two cells of this block.
    fn link_cells(&mut self, from: usize, to: usize, direction: CompassPrimary) {
        debug_assert_ne!(from, to);
        if from < to {
            let (low, high) = self.cells.split_at_mut(to);
            cells::link(&mut low[from], &mut high[0], direction);
        } else {
            let (low, high) = self.cells.split_at_mut(from);
            cells::link(&mut high[0], &mut low[to], direction);
        }
    }

    fn random_empty_cell(&self, rng: &mut MazeRng) -> usize {
        debug_assert!(!self.is_generated());
        loop {
            let index = rng.gen_range(0..self.size());
            if self.cells[index].cell_type() == CellType::Empty {
                return index;
            }
        }
    }

    fn exits_block(&self, index: usize, direction: CompassPrimary, borders: &Borders) -> bool {
        self.neighbour_index(index, direction).is_none() &&
        borders.can_exit(direction, self.edge_offset(index, direction))
    }

    fn can_step(&self, index: usize, direction: CompassPrimary, borders: &Borders) -> bool {
        match self.neighbour_index(index, direction) {
            Some(next) => !self.cells[next].is_closed(),
            None => borders.can_exit(direction, self.edge_offset(index, direction)),
        }
    }

    /// Uniformly random direction, retried until it is a legal step.
    fn random_step_direction(&self,
                             index: usize,
                             borders: &Borders,
                             rng: &mut MazeRng)
                             -> Result<CompassPrimary> {
        let legal = CompassPrimary::ALL
            .iter()
            .cloned()
            .filter(|dir| self.can_step(index, *dir, borders))
            .collect::<DirectionSmallVec>();
        if legal.is_empty() {
            bail!(ErrorKind::UnreachableCells(1));
        }
        loop {
            let dir = CompassPrimary::rand_direction(rng);
            if legal.contains(&dir) {
                return Ok(dir);
            }
        }
    }

    fn random_walk(&mut self, borders: &Borders, rng: &mut MazeRng) -> Result<Option<BorderCrossing>> {
        let start = self.random_empty_cell(rng);

        // First pass: wander until reaching the maze. Revisiting a cell overwrites its exit
        // direction, which erases the loop made since the last visit.
        let mut current = start;
        loop {
            let dir = self.random_step_direction(current, borders, rng)?;
            self.cells[current].set_exit_dir(dir);
            if self.exits_block(current, dir, borders) {
                break;
            }
            current = self.neighbour_index(current, dir).expect("legal step stays inside the block");
            if self.visited.contains(current) {
                break;
            }
        }

        // Second pass: follow the exit directions from the start and carve.
        current = start;
        loop {
            self.add_to_maze(current);
            let dir = self.cells[current].exit_dir().expect("walked cell has an exit direction");
            if self.exits_block(current, dir, borders) {
                return Ok(Some(BorderCrossing {
                    cell: current,
                    direction: dir,
                    offset: self.edge_offset(current, dir),
                }));
            }
            let next = self.neighbour_index(current, dir).expect("legal step stays inside the block");
            let reached_maze = self.visited.contains(next);
            self.link_cells(current, next, dir);
            if reached_maze {
                return Ok(None);
            }
            current = next;
        }
    }

    /// Connected groups of free cells, treating `reserved` as closed too.
    fn free_components(&self, reserved: &[usize]) -> Vec<Vec<usize>> {
        let is_free = |index: usize| !self.cells[index].is_closed() && !reserved.contains(&index);
        let mut seen = BitSet::with_capacity(self.size());
        let mut components = Vec::new();

        for start in 0..self.size() {
            if !is_free(start) || seen.contains(start) {
                continue;
            }
            let _ = seen.insert(start);
            let mut component = vec![];
            let mut frontier = vec![start];
            while let Some(index) = frontier.pop() {
                component.push(index);
                for &dir in &CompassPrimary::ALL {
                    if let Some(next) = self.neighbour_index(index, dir) {
                        if is_free(next) && seen.insert(next) {
                            frontier.push(next);
                        }
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Free cells that no walk could ever carry into the maze.
    fn unreachable_cells(&self, borders: &Borders) -> usize {
        let components = self.free_components(&[]);
        if borders.is_empty() {
            // Everything has to join up with the single seed cell.
            let total = components.iter().map(|c| c.len()).sum::<usize>();
            let largest = components.iter().map(|c| c.len()).max().unwrap_or(0);
            total - largest
        } else {
            components.iter()
                .filter(|component| {
                    !component.iter().any(|&index| {
                        CompassPrimary::ALL.iter().any(|&dir| self.exits_block(index, dir, borders))
                    })
                })
                .map(|component| component.len())
                .sum()
        }
    }
}

#[cfg(test)]
mod tests {

    use std::collections::VecDeque;

    use quickcheck::{quickcheck, TestResult};

    use super::*;
    use crate::encoding::Tile;
    use crate::utils;

    fn generated_block(w: usize, h: usize, seed: u64) -> Block {
        let mut rng = utils::seeded_rng(seed);
        let mut block = Block::new(Width(w), Height(h)).expect("valid dimensions");
        let crossings = block.generate(&Borders::none(), &mut rng).expect("generation failed");
        assert!(crossings.is_empty());
        block
    }

    fn closed_block(w: usize, h: usize, seed: u64) -> Block {
        let mut rng = utils::seeded_rng(seed);
        let mut block = Block::with_closed_spaces(Width(w), Height(h), &mut rng)
            .expect("closed space placement failed");
        block.generate(&Borders::none(), &mut rng).expect("generation failed");
        block
    }

    fn open_count(block: &Block) -> usize {
        block.cells().iter().filter(|cell| cell.is_open()).count()
    }

    fn reachable_open_cells(block: &Block) -> usize {
        let start = match block.cells().iter().position(|cell| cell.is_open()) {
            Some(start) => start,
            None => return 0,
        };
        let mut seen = BitSet::new();
        seen.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(index) = queue.pop_front() {
            for dir in block.cells()[index].open_directions().iter() {
                if let Some(next) = block.neighbour_index(index, *dir) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen.len()
    }

    fn assert_flags_symmetric(block: &Block) {
        for index in 0..block.size() {
            for &dir in &CompassPrimary::ALL {
                if let Some(next) = block.neighbour_index(index, dir) {
                    assert_eq!(block.cells()[index].is_open_towards(dir),
                               block.cells()[next].is_open_towards(dir.opposite()),
                               "asymmetric passage between {} and {}", index, next);
                }
            }
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Block::new(Width(0), Height(3)).is_err());
        assert!(Block::new(Width(3), Height(0)).is_err());
    }

    #[test]
    fn cell_indexing() {
        let block = Block::new(Width(4), Height(3)).unwrap();
        assert_eq!(block.cell_index(ColumnIndex(0), RowIndex(0)), Some(0));
        assert_eq!(block.cell_index(ColumnIndex(3), RowIndex(2)), Some(11));
        assert_eq!(block.cell_index(ColumnIndex(4), RowIndex(0)), None);
        assert_eq!(block.cell_index(ColumnIndex(0), RowIndex(3)), None);
        assert_eq!(block.coordinates(6), (ColumnIndex(2), RowIndex(1)));

        assert_eq!(block.neighbour_index(0, CompassPrimary::North), None);
        assert_eq!(block.neighbour_index(0, CompassPrimary::West), None);
        assert_eq!(block.neighbour_index(0, CompassPrimary::East), Some(1));
        assert_eq!(block.neighbour_index(0, CompassPrimary::South), Some(4));
        assert_eq!(block.neighbour_index(11, CompassPrimary::East), None);
        assert_eq!(block.neighbour_index(11, CompassPrimary::South), None);
    }

    #[test]
    fn border_cells() {
        let block = Block::new(Width(4), Height(3)).unwrap();
        assert_eq!(block.edge_length(CompassPrimary::North), 4);
        assert_eq!(block.edge_length(CompassPrimary::East), 3);
        assert_eq!(block.border_cell_index(CompassPrimary::North, EdgeOffset(2)), 2);
        assert_eq!(block.border_cell_index(CompassPrimary::South, EdgeOffset(2)), 10);
        assert_eq!(block.border_cell_index(CompassPrimary::West, EdgeOffset(1)), 4);
        assert_eq!(block.border_cell_index(CompassPrimary::East, EdgeOffset(1)), 7);
        assert_eq!(block.edge_offset(7, CompassPrimary::East), EdgeOffset(1));
        assert_eq!(block.edge_offset(10, CompassPrimary::South), EdgeOffset(2));
    }

    #[test]
    fn generates_a_spanning_tree() {
        for seed in 0..20 {
            let block = generated_block(8, 6, seed);
            assert!(block.is_generated());
            assert_eq!(open_count(&block), 48);
            assert_eq!(block.links_count(), 47);
            assert_eq!(reachable_open_cells(&block), 48);
            assert_flags_symmetric(&block);
        }
    }

    #[test]
    fn single_cell_block() {
        let block = generated_block(1, 1, 3);
        assert_eq!(open_count(&block), 1);
        assert_eq!(block.links_count(), 0);
        assert_eq!(block.to_text(true, false).unwrap(), "O");
    }

    #[test]
    fn three_by_three_example() {
        let block = generated_block(3, 3, 0);
        assert_eq!(open_count(&block), 9);
        assert_eq!(block.links_count(), 8);

        let tiles = block.to_tiles(true).unwrap();
        assert_eq!((tiles.width(), tiles.height()), (5, 5));

        // no walk could leave an unlinked block, so a frame around it is solid wall
        let framed = tiles.framed().to_obstacles();
        let last = framed.len() - 1;
        assert!(framed[0].iter().all(|&obstacle| obstacle));
        assert!(framed[last].iter().all(|&obstacle| obstacle));
        assert!(framed.iter().all(|row| row[0] && row[row.len() - 1]));
        for (index, cell) in block.cells().iter().enumerate() {
            for dir in cell.open_directions().iter() {
                assert!(block.neighbour_index(index, *dir).is_some());
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generated_block(10, 7, 1234);
        let b = generated_block(10, 7, 1234);
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.to_text(true, true).unwrap(), b.to_text(true, true).unwrap());

        let a = closed_block(10, 7, 99);
        let b = closed_block(10, 7, 99);
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn undensified_gaps_match_flags() {
        let block = generated_block(6, 5, 77);
        let tiles = block.to_tiles(true).unwrap();
        let mut path_gaps = 0;
        for y in 0..tiles.height() {
            for x in 0..tiles.width() {
                let tile = tiles.get(x, y).unwrap();
                match (x % 2, y % 2) {
                    (0, 0) => assert!(tile.is_traversable()),
                    (1, 0) => {
                        let cell = block.cell(ColumnIndex(x / 2), RowIndex(y / 2)).unwrap();
                        assert_eq!(tile == Tile::Path, cell.is_open_towards(CompassPrimary::East));
                        if tile == Tile::Path { path_gaps += 1; }
                    }
                    (0, 1) => {
                        let cell = block.cell(ColumnIndex(x / 2), RowIndex(y / 2)).unwrap();
                        assert_eq!(tile == Tile::Path, cell.is_open_towards(CompassPrimary::South));
                        if tile == Tile::Path { path_gaps += 1; }
                    }
                    _ => assert_eq!(tile, Tile::Wall),
                }
            }
        }
        assert_eq!(path_gaps, block.links_count());
    }

    #[test]
    fn dense_text_has_one_symbol_per_cell() {
        let block = generated_block(4, 2, 5);
        assert_eq!(block.to_text(false, true).unwrap(), "OOOO\nOOOO\n");
        assert_eq!(block.to_text(false, false).unwrap(), "OOOOOOOO");
    }

    #[test]
    fn custom_symbols_and_debug_directions() {
        let mut block = generated_block(3, 1, 8);
        block.set_symbols(CellSymbols::new('#', '.', '~'));
        assert_eq!(block.to_text(true, false).unwrap(), ".....");

        block.set_debug_directions(true);
        let text = block.to_text(false, false).unwrap();
        // every cell but the seed remembers the way its walk left
        assert_eq!(text.chars().filter(|c| *c == '.').count(), 1);
        assert_eq!(text.chars().filter(|c| "EW".contains(*c)).count(), 2);
    }

    #[test]
    fn small_blocks_reserve_one_closed_cell() {
        let block = closed_block(4, 4, 11);
        assert_eq!(block.closed_count(), 1);
        assert!(block.is_generated());
        assert_eq!(open_count(&block), 15);
        assert_eq!(block.links_count(), 14);
        assert_eq!(reachable_open_cells(&block), 15);
    }

    #[test]
    fn large_blocks_reserve_a_closed_square() {
        for seed in 0..10 {
            let block = closed_block(6, 5, seed);
            assert_eq!(block.closed_count(), 4);
            assert!(block.is_generated());
            assert_eq!(block.visited_count(), 26);
            assert_eq!(block.links_count(), 25);
            assert_eq!(reachable_open_cells(&block), 26);
            assert_flags_symmetric(&block);

            let closed = block.cells()
                .iter()
                .enumerate()
                .filter(|&(_, cell)| cell.is_closed())
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            assert_eq!(closed[1], closed[0] + 1);
            assert_eq!(closed[2], closed[0] + 6);
            assert_eq!(closed[3], closed[0] + 7);

            // the middle of the square is closed in the undensified grid
            let text = block.to_text(true, true).unwrap();
            assert_eq!(text.chars().filter(|c| *c == 'C').count(), 9);
        }
    }

    fn assert_every_edge_enterable(block: &Block) {
        for &dir in &CompassPrimary::ALL {
            assert!(block.enterable_border(dir).iter().any(|&free| free),
                    "{:?} edge of a {}x{} block is closed", dir, block.width(), block.height());
        }
    }

    #[test]
    fn narrow_blocks_fall_back_to_one_closed_cell() {
        // a 2x2 square in a two cell wide strip either splits it or closes an end
        for seed in 0..30 {
            for &(w, h) in &[(2, 13), (13, 2)] {
                let block = closed_block(w, h, seed);
                assert_eq!(block.closed_count(), 1);
                assert_eq!(reachable_open_cells(&block), 25);
                assert_eq!(block.links_count(), 24);
                assert_every_edge_enterable(&block);
            }
        }
    }

    #[test]
    fn closed_spaces_leave_every_edge_enterable() {
        for seed in 0..20 {
            for &(w, h) in &[(2, 2), (3, 2), (2, 5), (4, 4), (5, 5), (6, 5), (3, 9)] {
                let block = closed_block(w, h, seed);
                assert!(block.closed_count() > 0);
                assert_every_edge_enterable(&block);
            }
        }
    }

    #[test]
    fn single_cell_strips_get_no_closed_space() {
        let mut rng = utils::seeded_rng(1);
        for &(w, h) in &[(1, 1), (1, 2), (1, 7), (30, 1)] {
            let mut block = Block::with_closed_spaces(Width(w), Height(h), &mut rng).unwrap();
            assert_eq!(block.closed_count(), 0);
            assert!(!block.is_generated());
            assert_eq!(block.generate(&Borders::none(), &mut rng).unwrap(), vec![]);
            assert_eq!(block.links_count(), w * h - 1);
        }
    }

    #[test]
    fn sealing_an_edge_only_touches_that_edge() {
        let mut rng = utils::seeded_rng(8);
        let mut block = Block::new(Width(3), Height(2)).unwrap();
        let borders = Borders::none().with_side(CompassPrimary::East, vec![true; 2]);
        let crossings = block.generate(&borders, &mut rng).unwrap();
        assert!(!crossings.is_empty());
        let links = block.links();
        for crossing in &crossings {
            // the cell across the edge
            cells::link(&mut Cell::default(), block.cell_mut(crossing.cell), CompassPrimary::West);
        }
        assert_eq!(block.seal_edge(CompassPrimary::East), crossings.len());
        assert_eq!(block.seal_edge(CompassPrimary::East), 0);
        assert_eq!(block.links(), links);
        assert!(block.cells().iter().all(|cell| !cell.is_open_towards(CompassPrimary::East)));
    }

    #[test]
    fn carving_joins_two_cells() {
        let mut block = Block::new(Width(3), Height(3)).unwrap();
        block.carve(4, CompassPrimary::North);
        block.carve(4, CompassPrimary::East);
        assert_eq!(block.links(), vec![(1, 4), (4, 5)]);
        assert_flags_symmetric(&block);
    }

    #[test]
    fn querying_before_generation_fails() {
        let block = Block::new(Width(3), Height(3)).unwrap();
        for result in &[block.to_text(true, true).map(|_| ()), block.to_bool_grid().map(|_| ())] {
            match *result.as_ref().unwrap_err().kind() {
                ErrorKind::NotGenerated => {}
                ref other => panic!("expected not generated, got {:?}", other),
            }
        }
    }

    #[test]
    fn walks_leave_through_bordered_edges() {
        let mut rng = utils::seeded_rng(21);
        let mut block = Block::new(Width(5), Height(4)).unwrap();
        let borders = Borders::none().with_side(CompassPrimary::West, vec![true; 4]);
        let crossings = block.generate(&borders, &mut rng).unwrap();

        assert!(block.is_generated());
        assert!(!crossings.is_empty());
        for crossing in &crossings {
            assert_eq!(crossing.direction, CompassPrimary::West);
            assert_eq!(block.coordinates(crossing.cell).0, ColumnIndex(0));
            assert_eq!(block.edge_offset(crossing.cell, CompassPrimary::West), crossing.offset);
        }
        // one tree hangs off each crossing
        assert_eq!(block.links_count(), 20 - crossings.len());
        assert_flags_symmetric(&block);
    }

    #[test]
    fn walks_only_enter_allowed_border_positions() {
        let mut rng = utils::seeded_rng(4);
        let mut block = Block::new(Width(3), Height(3)).unwrap();
        let borders = Borders::none().with_side(CompassPrimary::North, vec![false, true, false]);
        let crossings = block.generate(&borders, &mut rng).unwrap();
        assert_eq!(crossings,
                   vec![BorderCrossing {
                            cell: 1,
                            direction: CompassPrimary::North,
                            offset: EdgeOffset(1),
                        }]);
        assert_eq!(block.links_count(), 8);
    }

    #[test]
    fn unreachable_cells_are_an_error() {
        let mut rng = utils::seeded_rng(2);
        let mut block = Block::new(Width(3), Height(3)).unwrap();
        let borders = Borders::none().with_side(CompassPrimary::East, vec![false; 3]);
        match *block.generate(&borders, &mut rng).unwrap_err().kind() {
            ErrorKind::UnreachableCells(count) => assert_eq!(count, 9),
            ref other => panic!("expected unreachable cells, got {:?}", other),
        }
    }

    #[test]
    fn quickcheck_generated_blocks_are_spanning_trees() {
        fn p(w: u8, h: u8, seed: u64, closed: bool) -> TestResult {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            let block = if closed { closed_block(w, h, seed) } else { generated_block(w, h, seed) };
            let open = open_count(&block);
            if open == 0 {
                return TestResult::from_bool(block.is_generated());
            }
            TestResult::from_bool(block.is_generated() &&
                                  open + block.closed_count() == w * h &&
                                  block.links_count() == open - 1 &&
                                  reachable_open_cells(&block) == open)
        }
        quickcheck(p as fn(u8, u8, u64, bool) -> TestResult);
    }
}
