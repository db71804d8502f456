//! Basic-block entries. A block entry starts a block and is never linked
//! into the straight-line instruction list; join entries may host phis.

use crate::bitset::BitVector;
use crate::il::{BlockId, InsnId};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BlockKind {
    /// The unique function entry; successors are the catch entries and the
    /// normal entry.
    GraphEntry,
    /// At most one predecessor. Interposed on every branch edge so the
    /// graph stays in edge-split form.
    TargetEntry,
    /// Two or more predecessors; the only block kind that hosts phis.
    JoinEntry,
    /// Entry of an exception handler, reached from the graph entry.
    CatchEntry,
}

/// Per-block bookkeeping: predecessors, body list bounds, traversal numbers,
/// dominator-tree links, the sparse phi array and loop membership.
#[derive(Clone, Debug)]
pub struct BlockData {
    pub kind: BlockKind,
    pub preds: Vec<BlockId>,
    pub first: Option<InsnId>,
    pub last: Option<InsnId>,
    /// Preorder number from block discovery; -1 until discovered.
    pub preorder_number: i32,
    pub postorder_number: i32,
    /// Reverse-postorder id used in printing and codegen ordering.
    pub block_id: i32,
    pub idom: Option<BlockId>,
    pub dominated: Vec<BlockId>,
    /// Sparse phi array indexed by variable number; join entries only.
    pub phis: Option<Vec<Option<InsnId>>>,
    pub phi_count: usize,
    /// Preorder numbers of the blocks in this block's natural loop, set on
    /// loop headers only.
    pub loop_info: Option<BitVector>,
    /// Lifetime position of the block start, assigned by the allocator.
    pub start_position: i32,
    pub end_position: i32,
}

impl BlockData {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            preds: Vec::new(),
            first: None,
            last: None,
            preorder_number: -1,
            postorder_number: -1,
            block_id: -1,
            idom: None,
            dominated: Vec::new(),
            phis: None,
            phi_count: 0,
            loop_info: None,
            start_position: -1,
            end_position: -1,
        }
    }

    pub fn is_join(&self) -> bool {
        self.kind == BlockKind::JoinEntry
    }

    pub fn add_predecessor(&mut self, pred: BlockId) {
        match self.kind {
            BlockKind::JoinEntry => self.preds.push(pred),
            _ => {
                debug_assert!(self.preds.is_empty(), "non-join block with two predecessors");
                self.preds.push(pred);
            }
        }
    }

    pub fn index_of_predecessor(&self, pred: BlockId) -> Option<usize> {
        self.preds.iter().position(|&p| p == pred)
    }
}
