//! **tiled_mazes** generates perfect mazes on rectangular blocks with Wilson's algorithm and
//! composes nine of them into one larger maze that can slide over an endless tiled world.

#[macro_use]
extern crate error_chain;

pub mod arena;
pub mod block;
pub mod cells;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod graph;
pub mod maze;
pub mod pathing;
pub mod units;
pub mod utils;
