//! Mazes as undirected graphs of cells and passages.
//!
//! Node `i` is the cell at row major index `i`, closed cells included as isolated nodes, so the
//! node indices line up with the edge list written out for other tools.

use petgraph::graph::{NodeIndex, UnGraph};

use crate::block::Block;
use crate::cells::CompassPrimary;
use crate::errors::*;
use crate::maze::{self, Maze, SLOTS_COUNT};
use crate::units::{ColumnIndex, EdgeOffset, RowIndex};

/// Node weights are the `(column, row)` of the cell.
pub type MazeGraph = UnGraph<(ColumnIndex, RowIndex), ()>;

pub fn block_graph(block: &Block) -> MazeGraph {
    let mut graph = MazeGraph::with_capacity(block.size(), block.size());
    for index in 0..block.size() {
        let _ = graph.add_node(block.coordinates(index));
    }
    for (a, b) in block.links() {
        let _ = graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    graph
}

/// One graph over the cells of all nine blocks, numbered row major across the whole maze.
pub fn maze_graph(maze: &Maze) -> Result<MazeGraph> {
    let blocks = maze.blocks()?;
    let (block_width, block_height) = (maze.config().block_width, maze.config().block_height);
    let row_length = 3 * block_width;
    let global_index = |slot: usize, index: usize| {
        let (ColumnIndex(x), RowIndex(y)) = blocks[slot].coordinates(index);
        let (gx, gy) = ((slot % 3) * block_width + x, (slot / 3) * block_height + y);
        gy * row_length + gx
    };

    let nodes_count = SLOTS_COUNT * block_width * block_height;
    let mut graph = MazeGraph::with_capacity(nodes_count, nodes_count);
    for i in 0..nodes_count {
        let _ = graph.add_node((ColumnIndex(i % row_length), RowIndex(i / row_length)));
    }

    for (slot, block) in blocks.iter().enumerate() {
        for (a, b) in block.links() {
            let _ = graph.add_edge(NodeIndex::new(global_index(slot, a)),
                                   NodeIndex::new(global_index(slot, b)),
                                   ());
        }

        // passages out of the east and south edges, each border passage counted once
        for &dir in &[CompassPrimary::East, CompassPrimary::South] {
            let other_slot = match maze::neighbour_slot(slot, dir) {
                Some(other_slot) => other_slot,
                None => continue,
            };
            for n in 0..block.edge_length(dir) {
                let ours = block.border_cell_index(dir, EdgeOffset(n));
                if block.cells()[ours].is_open_towards(dir) {
                    let theirs = blocks[other_slot].border_cell_index(dir.opposite(), EdgeOffset(n));
                    let _ = graph.add_edge(NodeIndex::new(global_index(slot, ours)),
                                           NodeIndex::new(global_index(other_slot, theirs)),
                                           ());
                }
            }
        }
    }
    Ok(graph)
}

/// Line 1 is `n m`, the vertex and edge counts, then one `a b` line per edge with 1-based vertex
/// indices.
pub fn edge_list_text(graph: &MazeGraph) -> String {
    let mut graph_data = String::new();
    graph_data.push_str(&format!("{} {}\n", graph.node_count(), graph.edge_count()));
    for edge in graph.raw_edges() {
        let src_as_1_based_index = edge.source().index() + 1;
        let dst_as_1_based_index = edge.target().index() + 1;
        graph_data.push_str(&format!("{} {}\n", src_as_1_based_index, dst_as_1_based_index));
    }
    graph_data
}

impl Block {
    pub fn to_graph(&self) -> MazeGraph {
        block_graph(self)
    }
}

impl Maze {
    pub fn to_graph(&self) -> Result<MazeGraph> {
        maze_graph(self)
    }
}
