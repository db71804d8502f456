// This module computes immediate dominators and dominance frontiers over a
// discovered flow graph using the SEMI-NCA algorithm: a two-pass variant of
// Lengauer-Tarjan that computes semidominators with a link-eval forest (path
// compression done in place on the spanning-tree parent array) and then
// derives immediate dominators as the nearest common ancestor of the
// spanning-tree parent and the semidominator. Runs in near-linear time in the
// number of blocks. The frontier computation walks each merge predecessor up
// the dominator chain, with bit-vector sets preventing duplicate insertion.
// All arrays are maps between preorder basic-block numbers.

use crate::bitset::BitVector;
use crate::il::FlowGraph;

/// Compute immediate dominators (stored on the blocks, together with the
/// dominated-block lists) and return the dominance frontier, indexed by
/// preorder number.
pub fn compute_dominators(graph: &mut FlowGraph) -> Vec<BitVector> {
    let size = graph.parent.len();
    debug_assert_eq!(size, graph.preorder.len());

    // Path compression mutates the parent array; work on a copy.
    let mut parent: Vec<usize> = graph.parent.clone();
    let mut idom: Vec<usize> = parent.clone();
    let mut semi: Vec<usize> = (0..size).collect();
    let mut label: Vec<usize> = (0..size).collect();
    let mut dominance_frontier: Vec<BitVector> =
        (0..size).map(|_| BitVector::new(size)).collect();

    // First pass: semidominators, in reverse preorder (excluding the entry).
    for block_index in (1..size).rev() {
        let block = graph.preorder[block_index];
        let preds = graph.block(block).preds.clone();
        for pred in preds {
            let pred_index = graph.block(pred).preorder_number as usize;
            let mut best = pred_index;
            if pred_index > block_index {
                compress_path(block_index, pred_index, &mut parent, &mut label);
                best = label[pred_index];
            }
            semi[block_index] = semi[block_index].min(semi[best]);
        }
        label[block_index] = semi[block_index];
    }

    // Second pass: idom = NCA(spanning-tree parent, semidominator).
    for block_index in 1..size {
        let mut dom_index = idom[block_index];
        while dom_index > semi[block_index] {
            dom_index = idom[dom_index];
        }
        idom[block_index] = dom_index;
        let block = graph.preorder[block_index];
        let dom_block = graph.preorder[dom_index];
        graph.block_mut(block).idom = Some(dom_block);
        graph.block_mut(dom_block).dominated.push(block);
    }

    // Dominance frontier: walk each merge predecessor up the dominator
    // chain, stopping at the merge block's own dominator.
    for block_index in 0..size {
        let block = graph.preorder[block_index];
        if graph.block(block).preds.len() <= 1 {
            continue;
        }
        let block_idom = graph.block(block).idom;
        let preds = graph.block(block).preds.clone();
        for pred in preds {
            let mut runner = pred;
            while Some(runner) != block_idom {
                let runner_index = graph.block(runner).preorder_number as usize;
                dominance_frontier[runner_index].add(block_index);
                runner = graph.block(runner).idom.expect("frontier walk passed the entry");
            }
        }
    }

    dominance_frontier
}

fn compress_path(
    start_index: usize,
    current_index: usize,
    parent: &mut Vec<usize>,
    label: &mut Vec<usize>,
) {
    let next_index = parent[current_index];
    if next_index > start_index {
        compress_path(start_index, next_index, parent, label);
        label[current_index] = label[current_index].min(label[next_index]);
        parent[current_index] = parent[next_index];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{BlockId, CmpKind, FunctionId, Obj, Val};

    // Brute-force dominance: D dominates B iff every entry-to-B path passes
    // through D. Computed by deleting D and checking reachability.
    fn brute_force_dominators(graph: &FlowGraph) -> Vec<Vec<bool>> {
        let n = graph.blocks.len();
        let entry = graph.graph_entry;
        let mut dom = vec![vec![false; n]; n];
        for d in 0..n {
            let mut reachable = vec![false; n];
            let mut stack = vec![entry];
            while let Some(block) = stack.pop() {
                if block.index() == d || reachable[block.index()] {
                    continue;
                }
                reachable[block.index()] = true;
                for succ in graph.block_successors(block) {
                    stack.push(succ);
                }
            }
            for b in 0..n {
                // Unreachable once d is removed means d dominates b.
                if graph.block(BlockId(b as u32)).preorder_number >= 0
                    && (!reachable[b] || b == d)
                {
                    dom[d][b] = true;
                }
            }
        }
        dom
    }

    fn check_idoms_against_brute_force(graph: &FlowGraph) {
        let dom = brute_force_dominators(graph);
        for &block in &graph.preorder {
            if block == graph.graph_entry {
                assert!(graph.block(block).idom.is_none());
                continue;
            }
            let idom = graph.block(block).idom.expect("reachable block without idom");
            // The immediate dominator dominates the block...
            assert!(dom[idom.index()][block.index()]);
            // ...and is the closest strict dominator: every other strict
            // dominator of the block also dominates the idom.
            for d in 0..graph.blocks.len() {
                if d != block.index() && dom[d][block.index()] && d != idom.index() {
                    assert!(
                        dom[d][idom.index()],
                        "B{d} strictly dominates B{} but not its idom B{}",
                        block.index(),
                        idom.index()
                    );
                }
            }
        }
    }

    fn diamond_graph() -> FlowGraph {
        let mut b = GraphBuilder::new(FunctionId(0), 1, 1);
        let t = b.target_block();
        let f = b.target_block();
        let join = b.join_block();
        let x = b.load_local(0);
        b.branch(CmpKind::Ne, x, Val::Constant(Obj::Smi(0)), t, f);
        b.switch_to(t);
        b.store_local(0, Val::Constant(Obj::Smi(1)));
        b.goto_(join);
        b.switch_to(f);
        b.store_local(0, Val::Constant(Obj::Smi(2)));
        b.goto_(join);
        b.switch_to(join);
        let v = b.load_local(0);
        b.ret(v);
        b.finish()
    }

    #[test]
    fn test_diamond_idoms_match_brute_force() {
        let mut graph = diamond_graph();
        compute_dominators(&mut graph);
        check_idoms_against_brute_force(&graph);
        // The join is dominated by the branching block, not by either arm.
        let join = graph
            .preorder
            .iter()
            .copied()
            .find(|&b| graph.block(b).is_join())
            .unwrap();
        assert_eq!(graph.block(join).idom, Some(graph.normal_entry));
    }

    #[test]
    fn test_nested_branches_match_brute_force() {
        // A 10-block shape: branch, one arm branching again, all joining.
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let outer_t = b.target_block();
        let outer_f = b.target_block();
        let inner_t = b.target_block();
        let inner_f = b.target_block();
        let inner_join = b.join_block();
        let outer_join = b.join_block();

        let x = b.load_local(0);
        b.branch(CmpKind::Ne, x, Val::Constant(Obj::Smi(0)), outer_t, outer_f);

        b.switch_to(outer_t);
        let x2 = b.load_local(0);
        b.branch(CmpKind::Lt, x2, Val::Constant(Obj::Smi(10)), inner_t, inner_f);
        b.switch_to(inner_t);
        b.store_local(1, Val::Constant(Obj::Smi(1)));
        b.goto_(inner_join);
        b.switch_to(inner_f);
        b.store_local(1, Val::Constant(Obj::Smi(2)));
        b.goto_(inner_join);
        b.switch_to(inner_join);
        b.goto_(outer_join);

        b.switch_to(outer_f);
        b.store_local(1, Val::Constant(Obj::Smi(3)));
        b.goto_(outer_join);

        b.switch_to(outer_join);
        let r = b.load_local(1);
        b.ret(r);

        let mut graph = b.finish();
        compute_dominators(&mut graph);
        check_idoms_against_brute_force(&graph);
    }

    #[test]
    fn test_loop_idoms_match_brute_force() {
        // entry -> header(join) -> body(target) -> header; header -> exit.
        let mut b = GraphBuilder::new(FunctionId(0), 1, 0);
        let header = b.join_block();
        let body = b.target_block();
        let exit = b.target_block();
        b.store_local(0, Val::Constant(Obj::Smi(0)));
        b.goto_(header);
        b.switch_to(header);
        let i = b.load_local(0);
        b.branch(CmpKind::Lt, i, Val::Constant(Obj::Smi(10)), body, exit);
        b.switch_to(body);
        let i2 = b.load_local(0);
        b.store_local(0, i2);
        b.goto_(header);
        b.switch_to(exit);
        let r = b.load_local(0);
        b.ret(r);

        let mut graph = b.finish();
        compute_dominators(&mut graph);
        check_idoms_against_brute_force(&graph);
        // The header dominates the loop body and the exit.
        assert_eq!(graph.block(body).idom, Some(header));
        assert_eq!(graph.block(exit).idom, Some(header));
    }

    #[test]
    fn test_dominance_frontier_of_diamond_arms_is_join() {
        let mut graph = diamond_graph();
        let frontier = compute_dominators(&mut graph);
        let join = graph
            .preorder
            .iter()
            .copied()
            .find(|&b| graph.block(b).is_join())
            .unwrap();
        let join_pre = graph.block(join).preorder_number as usize;
        for &pred in &graph.block(join).preds.clone() {
            let pred_pre = graph.block(pred).preorder_number as usize;
            assert!(frontier[pred_pre].contains(join_pre));
        }
        // The branching block dominates the join; the join is not in its
        // frontier.
        let entry_pre = graph.block(graph.normal_entry).preorder_number as usize;
        assert!(!frontier[entry_pre].contains(join_pre));
    }
}
