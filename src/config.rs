use crate::errors::*;
use crate::units::{Height, Width};

/// The characters used when a maze is rendered as text.
///
/// One vocabulary is shared by a composed maze and all of its blocks.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CellSymbols {
    pub wall: char,
    pub path: char,
    pub closed: char,
}

impl CellSymbols {
    pub fn new(wall: char, path: char, closed: char) -> CellSymbols {
        CellSymbols { wall, path, closed }
    }
}

impl Default for CellSymbols {
    fn default() -> CellSymbols {
        CellSymbols::new(' ', 'O', 'C')
    }
}

/// Construction parameters for a composed maze.
///
/// `block_width` and `block_height` are the dense cell dimensions of each of the nine blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeConfig {
    pub block_width: usize,
    pub block_height: usize,
    pub insert_closed_spaces: bool,
    pub symbols: CellSymbols,
    pub debug_directions: bool,
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig {
            block_width: 5,
            block_height: 5,
            insert_closed_spaces: false,
            symbols: CellSymbols::default(),
            debug_directions: false,
            seed: None,
        }
    }
}

impl MazeConfig {
    pub fn new(block_width: usize, block_height: usize) -> MazeConfig {
        MazeConfig {
            block_width,
            block_height,
            ..MazeConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_dimensions(Width(self.block_width), Height(self.block_height))
    }
}

pub fn validate_dimensions(width: Width, height: Height) -> Result<()> {
    if width.0 == 0 || height.0 == 0 {
        bail!(ErrorKind::InvalidDimensions(width.0, height.0));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MazeConfigBuilder {
    config: MazeConfig,
}

impl MazeConfigBuilder {
    pub fn new() -> MazeConfigBuilder {
        MazeConfigBuilder::default()
    }
    pub fn block_width(mut self, width: usize) -> MazeConfigBuilder {
        self.config.block_width = width;
        self
    }
    pub fn block_height(mut self, height: usize) -> MazeConfigBuilder {
        self.config.block_height = height;
        self
    }
    pub fn insert_closed_spaces(mut self, on: bool) -> MazeConfigBuilder {
        self.config.insert_closed_spaces = on;
        self
    }
    pub fn symbols(mut self, symbols: CellSymbols) -> MazeConfigBuilder {
        self.config.symbols = symbols;
        self
    }
    pub fn debug_directions(mut self, on: bool) -> MazeConfigBuilder {
        self.config.debug_directions = on;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> MazeConfigBuilder {
        self.config.seed = seed;
        self
    }
    pub fn build(self) -> MazeConfig {
        self.config
    }
}
