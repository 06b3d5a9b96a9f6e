// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get access to everything `error_chain!` creates.
#![allow(deprecated)]

use crate::arena::BlockId;

error_chain! {

    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid maze dimensions")
            display("invalid block dimensions {}x{}, width and height must be positive", width, height)
        }
        NotGenerated {
            description("maze not generated")
            display("maze queried before generation completed")
        }
        UnreachableCells(count: usize) {
            description("unreachable cells")
            display("{} free cells cannot be reached by any walk", count)
        }
        StaleBlock(id: BlockId) {
            description("stale block id")
            display("block {:?} has been discarded", id)
        }
        InvalidSlot(slot: usize) {
            description("invalid block slot")
            display("block slot {} is outside the 3x3 composition", slot)
        }
    }
}
