use docopt::Docopt;
use error_chain::bail;
use log::{info, LevelFilter};
use serde_derive::Deserialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tiled_mazes::{
    cells::CompassPrimary,
    config::{CellSymbols, MazeConfigBuilder},
    graph,
    maze::Maze,
    pathing,
};
use std::{
    io,
    io::prelude::*,
    fs::File,
};

const USAGE: &str = "Tiled Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver [--block-width=<w> --block-height=<h>] [--closed-spaces] [--seed=<n>] [--extra-paths] [--shift=<dirs>] [--bool-grid] [--debug-directions] [--wall=<c> --path=<c> --closed=<c>] [--text-out=<path>] [--save-edges=<path>] [--verbose]

Options:
    -h --help              Show this screen.
    --block-width=<w>      Cell width of each of the nine blocks [default: 5].
    --block-height=<h>     Cell height of each of the nine blocks [default: 5].
    --closed-spaces        Reserve a closed area in every block.
    --seed=<n>             Seed for the random number generator, random if not given.
    --extra-paths          Add one more passage between every pair of adjacent blocks.
    --shift=<dirs>         Shift the maze once per letter, e.g. NNEW.
    --bool-grid            Print the obstacle grid as 0s and 1s instead of symbols.
    --debug-directions     Show the direction each cell's generating walk left by.
    --wall=<c>             Wall symbol, a space if not given.
    --path=<c>             Path symbol [default: O].
    --closed=<c>           Closed space symbol [default: C].
    --text-out=<path>      Output file path for the textual rendering, stdout if not given.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
    --verbose              Log generation details.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_block_width: usize,
    flag_block_height: usize,
    flag_closed_spaces: bool,
    flag_seed: Option<u64>,
    flag_extra_paths: bool,
    flag_shift: String,
    flag_bool_grid: bool,
    flag_debug_directions: bool,
    flag_wall: String,
    flag_path: String,
    flag_closed: String,
    flag_text_out: String,
    flag_save_edges: String,
    flag_verbose: bool,
}

// We'll put our errors in an `errors` module, and other modules in
// this crate will `use errors::*;` to get access to everything
// `error_chain!` creates.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::tiled_mazes::errors::Error, ::tiled_mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Log(::log::SetLoggerError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let level = if args.flag_verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let symbols = CellSymbols::new(symbol_arg(&args.flag_wall, ' '),
                                   symbol_arg(&args.flag_path, 'O'),
                                   symbol_arg(&args.flag_closed, 'C'));
    let config = MazeConfigBuilder::new()
        .block_width(args.flag_block_width)
        .block_height(args.flag_block_height)
        .insert_closed_spaces(args.flag_closed_spaces)
        .symbols(symbols)
        .debug_directions(args.flag_debug_directions)
        .seed(args.flag_seed)
        .build();

    let mut maze = Maze::new(config)?;

    if args.flag_extra_paths {
        let carved = maze.add_extra_paths()?;
        info!("carved {} extra paths", carved);
    }

    for direction in shift_directions(&args.flag_shift)? {
        maze.shift(direction)?;
    }

    if !args.flag_save_edges.is_empty() {
        let edges = graph::edge_list_text(&maze.to_graph()?);
        write_text_to_file(&edges, &args.flag_save_edges)
            .chain_err(|| format!("Failed to write maze graph to text file {}", args.flag_save_edges))?;
    }

    let grid = maze.to_bool_grid()?;
    info!("{} connected regions", pathing::count_regions(&grid));
    if let Some(path) = pathing::longest_path(&grid) {
        info!("longest path {} tiles from {:?} to {:?}", path.len(), path[0], path[path.len() - 1]);
    }

    let text = if args.flag_bool_grid {
        bool_grid_text(&grid)
    } else {
        maze.to_text()?
    };

    if args.flag_text_out.is_empty() {
        print!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

/// First character of the argument, `default` when it is empty.
fn symbol_arg(arg: &str, default: char) -> char {
    arg.chars().next().unwrap_or(default)
}

fn shift_directions(letters: &str) -> Result<Vec<CompassPrimary>> {
    letters.chars()
        .map(|letter| -> Result<CompassPrimary> {
            match letter.to_ascii_uppercase() {
                'N' => Ok(CompassPrimary::North),
                'E' => Ok(CompassPrimary::East),
                'S' => Ok(CompassPrimary::South),
                'W' => Ok(CompassPrimary::West),
                other => bail!("Unknown shift direction '{}', expected one of N, E, S or W", other),
            }
        })
        .collect()
}

fn bool_grid_text(grid: &[Vec<bool>]) -> String {
    let mut text = String::new();
    for row in grid {
        text.extend(row.iter().map(|&obstacle| if obstacle { '1' } else { '0' }));
        text.push('\n');
    }
    text
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
