//! Storage for the blocks of a composed maze.
//!
//! Blocks refer to their neighbours by `BlockId`. Removing a block bumps the generation of its
//! slot, so an id kept from before the removal no longer resolves to anything.

use crate::block::Block;
use crate::errors::*;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct BlockId {
    index: u32,
    generation: u32,
}

impl BlockId {
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    block: Option<Block>,
}

#[derive(Clone, Debug, Default)]
pub struct BlockArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BlockArena {
    pub fn new() -> BlockArena {
        BlockArena::default()
    }

    pub fn with_capacity(capacity: usize) -> BlockArena {
        BlockArena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, block: Block) -> BlockId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.block = Some(block);
            BlockId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                block: Some(block),
            });
            BlockId {
                index,
                generation: 0,
            }
        }
    }

    /// Take a block out of the arena, invalidating every copy of `id`.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let block = slot.block.take();
        if block.is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        block
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.block.as_ref())
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.block.as_mut())
    }

    /// Like `get` but a stale id is an error.
    pub fn block(&self, id: BlockId) -> Result<&Block> {
        self.get(id).ok_or_else(|| ErrorKind::StaleBlock(id).into())
    }

    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.get_mut(id).ok_or_else(|| ErrorKind::StaleBlock(id).into())
    }

    /// Mutable access to two different blocks at once.
    pub fn pair_mut(&mut self, first: BlockId, second: BlockId) -> Result<(&mut Block, &mut Block)> {
        self.block(first)?;
        self.block(second)?;
        assert_ne!(first.index, second.index, "a block cannot be paired with itself");

        let (low, high) = if first.index < second.index {
            (first.index(), second.index())
        } else {
            (second.index(), first.index())
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let (low_block, high_block) = match (head[low].block.as_mut(), tail[0].block.as_mut()) {
            (Some(l), Some(h)) => (l, h),
            _ => unreachable!("both ids were just resolved"),
        };
        if first.index < second.index {
            Ok((low_block, high_block))
        } else {
            Ok((high_block, low_block))
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.block.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::units::{Height, Width};

    fn block() -> Block {
        Block::new(Width(2), Height(2)).expect("valid dimensions")
    }

    #[test]
    fn insert_and_lookup() {
        let mut arena = BlockArena::new();
        let a = arena.insert(block());
        let b = arena.insert(block());
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert!(arena.get(a).is_some());
        assert!(arena.get_mut(b).is_some());
    }

    #[test]
    fn removed_ids_go_stale() {
        let mut arena = BlockArena::new();
        let a = arena.insert(block());
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert!(arena.is_empty());

        // the slot is reused, the old id must not see the new block
        let b = arena.insert(block());
        assert_eq!(a.index(), b.index());
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        match *arena.block(a).unwrap_err().kind() {
            ErrorKind::StaleBlock(id) => assert_eq!(id, a),
            ref other => panic!("expected stale block, got {:?}", other),
        }
    }

    #[test]
    fn pairs_come_back_in_argument_order() {
        let mut arena = BlockArena::new();
        let a = arena.insert(block());
        let b = arena.insert(Block::new(Width(3), Height(1)).unwrap());
        {
            let (first, second) = arena.pair_mut(b, a).unwrap();
            assert_eq!(first.width(), 3);
            assert_eq!(second.width(), 2);
        }
        let (first, second) = arena.pair_mut(a, b).unwrap();
        assert_eq!(first.width(), 2);
        assert_eq!(second.width(), 3);

        arena.remove(a);
        assert!(arena.pair_mut(a, b).is_err());
    }
}
