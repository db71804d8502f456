// This module owns the structural analyses that precede optimization: block
// discovery (preorder/postorder enumeration, spanning-tree parents, per-block
// assigned-variable sets) and conversion of the naive flow graph into SSA form
// (dominators, dominance frontiers, phi insertion, renaming, phi liveness).
// Block discovery is a plain depth-first walk; catch entries are visited before
// the normal entry so that the normal entry comes first in reverse postorder,
// which is the order unoptimized execution enters the function.

pub mod construct;
pub mod dominance;

use crate::bitset::BitVector;
use crate::error::Bailout;
use crate::il::{BlockId, FlowGraph, Op};

/// Depth-first block discovery. Computes preorder, postorder, reverse
/// postorder, the spanning-tree parent array and per-block assigned-variable
/// bit vectors, then numbers blocks in reverse postorder. Re-runnable: all
/// derived state is reset first.
pub fn discover_blocks(graph: &mut FlowGraph) {
    for block in &mut graph.blocks {
        block.preds.clear();
        block.preorder_number = -1;
        block.postorder_number = -1;
        block.block_id = -1;
        block.idom = None;
        block.dominated.clear();
        block.loop_info = None;
    }
    graph.preorder.clear();
    graph.postorder.clear();
    graph.reverse_postorder.clear();
    graph.parent.clear();
    graph.assigned_vars.clear();

    let entry = graph.graph_entry;
    graph.parent.push(0);
    graph.block_mut(entry).preorder_number = 0;
    graph.preorder.push(entry);
    graph.assigned_vars.push(BitVector::new(graph.variable_count));

    // Visit catch entries before the normal entry; the normal entry must be
    // first in reverse postorder.
    let catch_entries = graph.catch_entries.clone();
    for &catch_entry in catch_entries.iter().rev() {
        discover(graph, catch_entry, entry);
    }
    let normal = graph.normal_entry;
    discover(graph, normal, entry);

    graph.block_mut(entry).postorder_number = graph.postorder.len() as i32;
    graph.postorder.push(entry);

    let block_count = graph.postorder.len() as i32;
    for (i, &block) in graph.postorder.iter().enumerate() {
        graph.blocks[block.index()].block_id = block_count - 1 - i as i32;
    }
    graph.reverse_postorder = graph.postorder.iter().rev().copied().collect();
}

fn discover(graph: &mut FlowGraph, block: BlockId, pred: BlockId) {
    // 1. Record the predecessor. 2. A block already reached is done.
    graph.block_mut(block).add_predecessor(pred);
    if graph.block(block).preorder_number >= 0 {
        return;
    }

    // 3.-4. The visiting block is the spanning-tree parent; number the block
    // and accumulate its assigned-variable set over the straight-line body.
    graph.parent.push(graph.block(pred).preorder_number as usize);
    graph.block_mut(block).preorder_number = graph.preorder.len() as i32;
    graph.preorder.push(block);
    let mut vars = BitVector::new(graph.variable_count);
    for insn in graph.collect_block_insns(block) {
        graph.insn(insn).op.record_assigned_vars(&mut vars);
    }
    graph.assigned_vars.push(vars);
    debug_assert_eq!(graph.preorder.len(), graph.parent.len());
    debug_assert_eq!(graph.preorder.len(), graph.assigned_vars.len());

    // 5. Follow the terminator: a goto continues into its target, a branch
    // visits the false successor first so reverse postorder reads
    // true-then-false, a return ends the walk.
    let last = graph.block(block).last.map(|id| graph.insn(id).op.clone());
    match last {
        Some(Op::Goto { target }) => discover(graph, target, block),
        Some(Op::Branch { true_target, false_target, .. }) => {
            discover(graph, false_target, block);
            discover(graph, true_target, block);
        }
        Some(Op::Return { .. }) => {}
        _ => debug_assert!(false, "block without terminator"),
    }

    // 6. Postorder number on subtree completion.
    graph.block_mut(block).postorder_number = graph.postorder.len() as i32;
    graph.postorder.push(block);
}

/// Convert the discovered graph to SSA: dominators and frontiers, minimal
/// phi insertion, renaming, and transitive phi liveness. A bailout aborts
/// the whole optimizing compile attempt for this function.
pub fn compute_ssa(graph: &mut FlowGraph) -> Result<(), Bailout> {
    let dominance_frontier = dominance::compute_dominators(graph);
    construct::insert_phis(graph, &dominance_frontier);
    construct::rename(graph)
}
