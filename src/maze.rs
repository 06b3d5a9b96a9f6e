//! Nine blocks composed into one larger maze.
//!
//! Slots are numbered row major, 0 top left to 8 bottom right. Blocks are generated in an order
//! where each one after the centre already borders a generated block, so walks escaping a block
//! join the whole composition into a single connected maze.

use log::{debug, trace, warn};
use petgraph::unionfind::UnionFind;
use rand::seq::SliceRandom;

use crate::arena::{BlockArena, BlockId};
use crate::block::{Block, Borders};
use crate::cells::{self, CompassPrimary};
use crate::config::{CellSymbols, MazeConfig};
use crate::encoding::{Tile, TileGrid};
use crate::errors::*;
use crate::units::{ColumnIndex, EdgeOffset, Height, RowIndex, Width};
use crate::utils::{self, MazeRng};

pub const SLOTS_COUNT: usize = 9;
pub const CENTRE_SLOT: usize = 4;

/// Centre, then the edges, then the corners.
const GENERATION_ORDER: [usize; SLOTS_COUNT] = [4, 1, 3, 5, 7, 0, 2, 6, 8];

/// How often a block with closed spaces is re-reserved when its reservation walls it off from
/// its generated neighbours. After that it is generated without closed space.
const MAX_RESERVATION_ATTEMPTS: usize = 16;

/// Slot next to `slot` in `direction`, if that is still inside the 3x3 arrangement.
pub fn neighbour_slot(slot: usize, direction: CompassPrimary) -> Option<usize> {
    let (column, row) = (slot % 3, slot / 3);
    match direction {
        CompassPrimary::North if row > 0 => Some(slot - 3),
        CompassPrimary::South if row < 2 => Some(slot + 3),
        CompassPrimary::West if column > 0 => Some(slot - 1),
        CompassPrimary::East if column < 2 => Some(slot + 1),
        _ => None,
    }
}

/// The three slots along one outer edge, in order of increasing index.
pub fn edge_slots(direction: CompassPrimary) -> [usize; 3] {
    match direction {
        CompassPrimary::North => [0, 1, 2],
        CompassPrimary::East => [2, 5, 8],
        CompassPrimary::South => [6, 7, 8],
        CompassPrimary::West => [0, 3, 6],
    }
}

fn new_block(config: &MazeConfig, closed_spaces: bool, rng: &mut MazeRng) -> Result<Block> {
    let (width, height) = (Width(config.block_width), Height(config.block_height));
    let mut block = if closed_spaces {
        Block::with_closed_spaces(width, height, rng)?
    } else {
        Block::new(width, height)?
    };
    block.set_symbols(config.symbols);
    block.set_debug_directions(config.debug_directions);
    Ok(block)
}

/// Which band a position along the undensified maze falls in, None on a stitch line.
fn band_index(position: usize, band_span: usize) -> Option<usize> {
    let stride = band_span + 1;
    if position % stride == band_span {
        None
    } else {
        Some(position / stride)
    }
}

#[derive(Debug)]
pub struct Maze {
    config: MazeConfig,
    arena: BlockArena,
    slots: [BlockId; SLOTS_COUNT],
    rng: MazeRng,
}

impl Maze {
    /// Build and generate all nine blocks, seeding the generator from the config if it has a seed.
    pub fn new(config: MazeConfig) -> Result<Maze> {
        let rng = config.seed.map_or_else(utils::entropy_rng, utils::seeded_rng);
        Maze::with_rng(config, rng)
    }

    pub fn with_rng(config: MazeConfig, mut rng: MazeRng) -> Result<Maze> {
        config.validate()?;

        let mut arena = BlockArena::with_capacity(SLOTS_COUNT);
        let first = arena.insert(new_block(&config, config.insert_closed_spaces, &mut rng)?);
        let mut slots = [first; SLOTS_COUNT];
        for slot in slots.iter_mut().skip(1) {
            *slot = arena.insert(new_block(&config, config.insert_closed_spaces, &mut rng)?);
        }

        let mut maze = Maze {
            config,
            arena,
            slots,
            rng,
        };
        maze.relink_all()?;
        for &slot in &GENERATION_ORDER {
            maze.generate_slot(slot)?;
        }
        debug!("composed {}x{} maze from {}x{} blocks",
               maze.width(), maze.height(), maze.config.block_width, maze.config.block_height);
        Ok(maze)
    }

    #[inline]
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Undensified width of one block.
    #[inline]
    pub fn block_text_width(&self) -> usize {
        2 * self.config.block_width - 1
    }

    #[inline]
    pub fn block_text_height(&self) -> usize {
        2 * self.config.block_height - 1
    }

    /// Width of the composed undensified maze, stitch columns included.
    #[inline]
    pub fn width(&self) -> usize {
        3 * self.block_text_width() + 2
    }

    #[inline]
    pub fn height(&self) -> usize {
        3 * self.block_text_height() + 2
    }

    pub fn block_id(&self, slot: usize) -> Result<BlockId> {
        self.slots.get(slot).cloned().ok_or_else(|| ErrorKind::InvalidSlot(slot).into())
    }

    pub fn block(&self, slot: usize) -> Result<&Block> {
        self.arena.block(self.block_id(slot)?)
    }

    /// Look a block up by id. Fails for blocks discarded by a shift.
    pub fn block_by_id(&self, id: BlockId) -> Result<&Block> {
        self.arena.block(id)
    }

    /// All nine blocks in slot order.
    pub fn blocks(&self) -> Result<Vec<&Block>> {
        self.slots.iter().map(|&id| self.arena.block(id)).collect()
    }

    pub fn set_symbols(&mut self, symbols: CellSymbols) -> Result<()> {
        self.config.symbols = symbols;
        for &id in &self.slots {
            self.arena.block_mut(id)?.set_symbols(symbols);
        }
        Ok(())
    }

    pub fn set_debug_directions(&mut self, on: bool) -> Result<()> {
        self.config.debug_directions = on;
        for &id in &self.slots {
            self.arena.block_mut(id)?.set_debug_directions(on);
        }
        Ok(())
    }

    /// Point every block at the blocks in the slots around it.
    fn relink_all(&mut self) -> Result<()> {
        for slot in 0..SLOTS_COUNT {
            let neighbours = CompassPrimary::ALL
                .iter()
                .map(|&dir| (dir, neighbour_slot(slot, dir).map(|n| self.slots[n])))
                .collect::<Vec<_>>();
            let block = self.arena.block_mut(self.slots[slot])?;
            for (dir, neighbour) in neighbours {
                block.set_neighbour(dir, neighbour);
            }
        }
        Ok(())
    }

    /// The edges of a block that face already generated blocks.
    fn borders_of(&self, id: BlockId) -> Result<Borders> {
        let block = self.arena.block(id)?;
        let mut borders = Borders::none();
        for &dir in &CompassPrimary::ALL {
            if let Some(neighbour_id) = block.neighbour(dir) {
                let neighbour = self.arena.block(neighbour_id)?;
                if neighbour.is_generated() {
                    borders = borders.with_side(dir, neighbour.enterable_border(dir.opposite()));
                }
            }
        }
        Ok(borders)
    }

    fn generate_slot(&mut self, slot: usize) -> Result<()> {
        let id = self.block_id(slot)?;
        let borders = self.borders_of(id)?;

        let mut attempts = 1;
        let crossings = loop {
            let result = self.arena.block_mut(id)?.generate(&borders, &mut self.rng);
            let err = match result {
                Ok(crossings) => break crossings,
                Err(err) => err,
            };
            let reserved = self.arena.block(id)?.closed_count() > 0;
            let cut_off = match *err.kind() {
                ErrorKind::UnreachableCells(count) if reserved => Some(count),
                _ => None,
            };
            match cut_off {
                Some(count) => {
                    let closed_spaces = attempts < MAX_RESERVATION_ATTEMPTS;
                    warn!("closed spaces in slot {} cut off {} cells, {}", slot, count,
                          if closed_spaces { "reserving again" } else { "dropping the closed space" });
                    self.reserve_again(id, closed_spaces)?;
                    attempts += 1;
                }
                None => return Err(err),
            }
        };

        for crossing in crossings {
            let neighbour = self.arena
                .block(id)?
                .neighbour(crossing.direction)
                .expect("walks only cross into linked blocks");
            self.connect_across(id, crossing.cell, neighbour, crossing.direction, crossing.offset)?;
        }
        Ok(())
    }

    /// Swap an ungenerated block for a fresh one, with a new closed space reservation if
    /// `closed_spaces` is set.
    fn reserve_again(&mut self, id: BlockId, closed_spaces: bool) -> Result<()> {
        let neighbours = {
            let old = self.arena.block(id)?;
            CompassPrimary::ALL.iter().map(|&dir| (dir, old.neighbour(dir))).collect::<Vec<_>>()
        };
        let mut fresh = new_block(&self.config, closed_spaces, &mut self.rng)?;
        for (dir, neighbour) in neighbours {
            fresh.set_neighbour(dir, neighbour);
        }
        *self.arena.block_mut(id)? = fresh;
        Ok(())
    }

    /// Carve a passage from `cell` in block `id` to the cell across its `direction` edge.
    fn connect_across(&mut self,
                      id: BlockId,
                      cell: usize,
                      neighbour: BlockId,
                      direction: CompassPrimary,
                      offset: EdgeOffset)
                      -> Result<()> {
        let (block, other) = self.arena.pair_mut(id, neighbour)?;
        let other_cell = other.border_cell_index(direction.opposite(), offset);
        cells::link(block.cell_mut(cell), other.cell_mut(other_cell), direction);
        Ok(())
    }

    /// Force one more connection between each of the 12 pairs of adjacent blocks.
    ///
    /// Positions where either side is closed are never chosen. Returns the number of passages carved.
    pub fn add_extra_paths(&mut self) -> Result<usize> {
        let mut carved = 0;
        for slot in 0..SLOTS_COUNT {
            for &dir in &[CompassPrimary::East, CompassPrimary::South] {
                let other_slot = match neighbour_slot(slot, dir) {
                    Some(other_slot) => other_slot,
                    None => continue,
                };
                let (id, other_id) = (self.slots[slot], self.slots[other_slot]);
                let candidates = {
                    let (block, other) = (self.arena.block(id)?, self.arena.block(other_id)?);
                    (0..block.edge_length(dir))
                        .filter(|&n| {
                            let ours = block.border_cell_index(dir, EdgeOffset(n));
                            let theirs = other.border_cell_index(dir.opposite(), EdgeOffset(n));
                            !block.cells()[ours].is_closed() && !other.cells()[theirs].is_closed()
                        })
                        .collect::<Vec<usize>>()
                };
                match candidates.choose(&mut self.rng) {
                    Some(&n) => {
                        let cell = self.arena.block(id)?.border_cell_index(dir, EdgeOffset(n));
                        self.connect_across(id, cell, other_id, dir, EdgeOffset(n))?;
                        carved += 1;
                    }
                    None => warn!("no open position between slots {} and {}", slot, other_slot),
                }
            }
        }
        debug!("added {} extra paths", carved);
        Ok(carved)
    }

    /// Move the window one block towards `direction`.
    ///
    /// The three blocks on the opposite edge are discarded, the other six move one slot away
    /// from `direction` and three new blocks are generated along the `direction` edge. Passages
    /// that led into the discarded blocks are closed off. If that split the maze, the pieces are
    /// joined up again with new passages, across block borders where possible.
    ///
    /// A failed shift leaves the maze as it was before the call.
    pub fn shift(&mut self, direction: CompassPrimary) -> Result<()> {
        let (arena, slots) = (self.arena.clone(), self.slots);
        match self.shift_window(direction) {
            Ok(joined) => {
                debug!("shifted maze {:?}, {} passages carved to rejoin it", direction, joined);
                Ok(())
            }
            Err(err) => {
                self.arena = arena;
                self.slots = slots;
                Err(err)
            }
        }
    }

    fn shift_window(&mut self, direction: CompassPrimary) -> Result<usize> {
        for &slot in &edge_slots(direction.opposite()) {
            let _ = self.arena.remove(self.slots[slot]);
        }

        let old_slots = self.slots;
        for slot in 0..SLOTS_COUNT {
            if let Some(source) = neighbour_slot(slot, direction) {
                self.slots[slot] = old_slots[source];
            }
        }

        let [first, middle, last] = edge_slots(direction);
        let fresh = [middle, first, last];
        for &slot in &fresh {
            let block = new_block(&self.config, self.config.insert_closed_spaces, &mut self.rng)?;
            self.slots[slot] = self.arena.insert(block);
        }
        self.relink_all()?;

        // The blocks now along the far edge faced the discarded ones.
        let far_side = direction.opposite();
        let mut sealed = 0;
        for &slot in &edge_slots(far_side) {
            sealed += self.arena.block_mut(self.slots[slot])?.seal_edge(far_side);
        }
        trace!("sealed {} passages into discarded blocks", sealed);

        for &slot in &fresh {
            self.generate_slot(slot)?;
        }
        self.join_regions()
    }

    /// Carve passages between cells of different connected regions until one region is left.
    ///
    /// Candidate passages across block borders are tried before ones inside blocks, each group in
    /// random order. Closed cells are never carved into. Returns the number of passages carved.
    fn join_regions(&mut self) -> Result<usize> {
        let (size, mut regions, mut across, mut inside) = {
            let blocks = self.blocks()?;
            let size = blocks[0].size();
            let mut regions = UnionFind::<usize>::new(SLOTS_COUNT * size);
            let mut across = Vec::new();
            let mut inside = Vec::new();

            for (slot, block) in blocks.iter().enumerate() {
                for (a, b) in block.links() {
                    let _ = regions.union(slot * size + a, slot * size + b);
                }
                for index in 0..size {
                    if block.cells()[index].is_closed() {
                        continue;
                    }
                    for &dir in &[CompassPrimary::East, CompassPrimary::South] {
                        if let Some(next) = block.neighbour_index(index, dir) {
                            if !block.cells()[next].is_closed() && !block.cells()[index].is_open_towards(dir) {
                                inside.push((slot, index, dir, next));
                            }
                            continue;
                        }
                        let other_slot = match neighbour_slot(slot, dir) {
                            Some(other_slot) => other_slot,
                            None => continue,
                        };
                        let offset = block.edge_offset(index, dir);
                        let other = blocks[other_slot];
                        let theirs = other.border_cell_index(dir.opposite(), offset);
                        if block.cells()[index].is_open_towards(dir) {
                            let _ = regions.union(slot * size + index, other_slot * size + theirs);
                        } else if !other.cells()[theirs].is_closed() {
                            across.push((slot, index, dir, other_slot, theirs, offset));
                        }
                    }
                }
            }
            (size, regions, across, inside)
        };
        across.shuffle(&mut self.rng);
        inside.shuffle(&mut self.rng);

        let mut carved = 0;
        for (slot, index, dir, other_slot, theirs, offset) in across {
            if regions.union(slot * size + index, other_slot * size + theirs) {
                self.connect_across(self.slots[slot], index, self.slots[other_slot], dir, offset)?;
                carved += 1;
            }
        }
        for (slot, index, dir, next) in inside {
            if regions.union(slot * size + index, slot * size + next) {
                self.arena.block_mut(self.slots[slot])?.carve(index, dir);
                carved += 1;
            }
        }
        Ok(carved)
    }

    pub fn shift_up(&mut self) -> Result<()> {
        self.shift(CompassPrimary::North)
    }

    pub fn shift_down(&mut self) -> Result<()> {
        self.shift(CompassPrimary::South)
    }

    pub fn shift_left(&mut self) -> Result<()> {
        self.shift(CompassPrimary::West)
    }

    pub fn shift_right(&mut self) -> Result<()> {
        self.shift(CompassPrimary::East)
    }

    /// Which slot a world position falls in when the maze is centred on `(centre_x, centre_y)`
    /// at one unit per undensified tile, y growing downwards.
    ///
    /// None outside the maze and on the stitch lines between blocks.
    pub fn block_slot_at_position(&self, x: f32, y: f32, centre_x: f32, centre_y: f32) -> Option<usize> {
        let grid_x = x - (centre_x - self.width() as f32 / 2.0);
        let grid_y = y - (centre_y - self.height() as f32 / 2.0);
        if grid_x < 0.0 || grid_y < 0.0 {
            return None;
        }
        let (grid_x, grid_y) = (grid_x.floor() as usize, grid_y.floor() as usize);
        if grid_x >= self.width() || grid_y >= self.height() {
            return None;
        }
        let column = band_index(grid_x, self.block_text_width())?;
        let row = band_index(grid_y, self.block_text_height())?;
        Some(row * 3 + column)
    }

    /// The undensified tiles of all nine blocks joined by stitch columns and rows.
    pub fn to_tiles(&self) -> Result<TileGrid> {
        let blocks = self.blocks()?;
        let tiles = blocks.iter().map(|block| block.to_tiles(true)).collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(self.height());
        for band in 0..3 {
            for y in 0..self.block_text_height() {
                let mut row = Vec::with_capacity(self.width());
                for column in 0..3 {
                    let slot = band * 3 + column;
                    if column > 0 {
                        row.push(self.stitch_column_tile(blocks[slot - 1], blocks[slot], y));
                    }
                    row.extend_from_slice(&tiles[slot].rows()[y]);
                }
                rows.push(row);
            }
            if band < 2 {
                rows.push(self.stitch_row(&blocks[band * 3..band * 3 + 6]));
            }
        }
        Ok(TileGrid::from_rows(rows))
    }

    /// Tile between two horizontally adjacent blocks on undensified row `y`.
    fn stitch_column_tile(&self, left: &Block, right: &Block, y: usize) -> Tile {
        if y % 2 == 1 {
            return Tile::Wall;
        }
        let row = RowIndex(y / 2);
        let last_column = ColumnIndex(left.width() - 1);
        let east_open = left.cell(last_column, row).map_or(false, |c| c.is_open_towards(CompassPrimary::East));
        let west_open = right.cell(ColumnIndex(0), row).map_or(false, |c| c.is_open_towards(CompassPrimary::West));
        if east_open || west_open { Tile::Path } else { Tile::Wall }
    }

    /// The row between a band of three blocks and the band below it. `bands` holds six blocks,
    /// the upper band then the lower band.
    fn stitch_row(&self, bands: &[&Block]) -> Vec<Tile> {
        let mut row = Vec::with_capacity(self.width());
        for column in 0..3 {
            let (upper, lower) = (bands[column], bands[column + 3]);
            if column > 0 {
                row.push(Tile::Wall);
            }
            let bottom_row = RowIndex(upper.height() - 1);
            for x in 0..self.block_text_width() {
                if x % 2 == 1 {
                    row.push(Tile::Wall);
                    continue;
                }
                let cell_column = ColumnIndex(x / 2);
                let south_open = upper.cell(cell_column, bottom_row)
                    .map_or(false, |c| c.is_open_towards(CompassPrimary::South));
                let north_open = lower.cell(cell_column, RowIndex(0))
                    .map_or(false, |c| c.is_open_towards(CompassPrimary::North));
                row.push(if south_open || north_open { Tile::Path } else { Tile::Wall });
            }
        }
        row
    }

    /// Row major text with line breaks, using the configured symbols.
    pub fn to_text(&self) -> Result<String> {
        Ok(self.to_tiles()?.to_text(&self.config.symbols, self.config.debug_directions, true))
    }

    /// Obstacle grid, `true` for walls and closed spaces.
    pub fn to_bool_grid(&self) -> Result<Vec<Vec<bool>>> {
        Ok(self.to_tiles()?.to_obstacles())
    }
}
