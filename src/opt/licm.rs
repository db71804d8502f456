// Loop-invariant code motion. Natural loops are recovered from back edges (a
// predecessor dominated by its join successor); each header carries a bit vector of
// the preorder numbers of its loop's blocks. The pre-header is the predecessor that
// is also the header's immediate dominator. A definition is hoisted when it is not
// an argument push, neither has nor is affected by side effects, and every operand
// is defined outside the loop (its defining block dominates the pre-header).
// Hoisted instructions adopt the pre-header goto's environment and deopt id so a
// later deopt re-enters before the loop.

use crate::bitset::BitVector;
use crate::il::{BlockId, FlowGraph, InsnId, Op, Val};

/// Find loop headers and populate their loop-membership bit vectors.
pub fn compute_loops(graph: &mut FlowGraph) -> Vec<BlockId> {
    let size = graph.preorder.len();
    let mut headers: Vec<BlockId> = Vec::new();
    let blocks = graph.preorder.clone();
    for &block in &blocks {
        for succ in graph.block_successors(block) {
            if !graph.block(succ).is_join() || !graph.dominates(succ, block) {
                continue;
            }
            // Back edge block -> succ; collect the natural loop.
            if graph.block(succ).loop_info.is_none() {
                graph.block_mut(succ).loop_info = Some(BitVector::new(size));
                headers.push(succ);
            }
            let header_index = graph.block(succ).preorder_number as usize;
            let mut worklist = vec![block];
            let mut info = graph.block_mut(succ).loop_info.take().unwrap();
            info.add(header_index);
            while let Some(member) = worklist.pop() {
                let member_index = graph.block(member).preorder_number as usize;
                if info.add(member_index) {
                    for &pred in &graph.block(member).preds {
                        worklist.push(pred);
                    }
                }
            }
            graph.block_mut(succ).loop_info = Some(info);
        }
    }
    headers
}

fn find_pre_header(graph: &FlowGraph, header: BlockId) -> Option<BlockId> {
    let idom = graph.block(header).idom?;
    graph.block(header).preds.iter().copied().find(|&pred| pred == idom)
}

fn is_hoistable(graph: &FlowGraph, id: InsnId, pre_header: BlockId) -> bool {
    let op = &graph.insn(id).op;
    if !op.is_definition() || matches!(op, Op::PushArgument { .. } | Op::Phi { .. }) {
        return false;
    }
    if op.has_side_effect() || op.affected_by_side_effect() {
        return false;
    }
    for i in 0..op.input_count() {
        if let Val::Use(def) = op.input_at(i) {
            let Some(def_block) = graph.insn(*def).block else { return false };
            if !graph.dominates(def_block, pre_header) {
                return false;
            }
        }
    }
    true
}

fn hoist(graph: &mut FlowGraph, pre_header: BlockId, id: InsnId) {
    log::debug!(
        "hoisting {}:{} to B{}",
        graph.insn(id).op.name(),
        id,
        graph.block(pre_header).block_id
    );
    graph.remove_from_graph(id);
    let last = graph.block(pre_header).last.expect("pre-header without terminator");
    debug_assert!(matches!(graph.insn(last).op, Op::Goto { .. }));
    graph.insert_before(last, id);
    // Deopt after hoisting must re-enter before the loop.
    let env = graph.insn(last).env.clone();
    let deopt_id = graph.insn(last).deopt_id;
    let data = graph.insn_mut(id);
    data.env = env;
    data.deopt_id = deopt_id;
}

pub fn optimize(graph: &mut FlowGraph) {
    let headers = compute_loops(graph);
    for header in headers {
        let Some(pre_header) = find_pre_header(graph, header) else { continue };
        let info = graph.block(header).loop_info.clone().expect("header without loop info");
        for block_index in info.iter() {
            let block = graph.preorder[block_index];
            for id in graph.collect_block_insns(block) {
                if is_hoistable(graph, id, pre_header) {
                    hoist(graph, pre_header, id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{CmpKind, FieldId, FunctionId, Obj, SmiOpKind};
    use crate::ssa::compute_ssa;

    // while (i < n) { k = 10 * 3; i = i + 1 } — the multiply of two
    // constants is invariant and moves to the pre-header.
    fn loop_with_invariant() -> (FlowGraph, BlockId, BlockId) {
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let header = b.join_block();
        let body = b.target_block();
        let exit = b.target_block();
        b.store_local(1, Val::Constant(Obj::Smi(0)));
        b.goto_(header);
        b.switch_to(header);
        let i = b.load_local(1);
        let n = b.load_local(0);
        b.branch(CmpKind::Lt, i, n, body, exit);
        b.switch_to(body);
        let k = b.binary_smi_op(SmiOpKind::Mul, Val::Constant(Obj::Smi(10)), Val::Constant(Obj::Smi(3)));
        b.check_smi(k);
        let i2 = b.load_local(1);
        let next = b.binary_smi_op(SmiOpKind::Add, i2, Val::Constant(Obj::Smi(1)));
        b.store_local(1, next);
        b.goto_(header);
        b.switch_to(exit);
        let r = b.load_local(1);
        b.ret(r);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        (graph, header, body)
    }

    #[test]
    fn test_loop_membership_covers_header_and_body() {
        let (mut graph, header, body) = loop_with_invariant();
        let headers = compute_loops(&mut graph);
        assert_eq!(headers, vec![header]);
        let info = graph.block(header).loop_info.as_ref().unwrap();
        assert!(info.contains(graph.block(header).preorder_number as usize));
        assert!(info.contains(graph.block(body).preorder_number as usize));
        assert_eq!(info.count(), 2);
    }

    #[test]
    fn test_invariant_multiply_is_hoisted_to_pre_header() {
        let (mut graph, header, body) = loop_with_invariant();
        optimize(&mut graph);

        let pre_header = graph.block(header).idom.unwrap();
        let hoisted = graph
            .collect_block_insns(pre_header)
            .iter()
            .any(|&id| matches!(graph.insn(id).op, Op::BinarySmiOp { op: SmiOpKind::Mul, .. }));
        assert!(hoisted, "multiply did not move to the pre-header");
        let still_in_body = graph
            .collect_block_insns(body)
            .iter()
            .any(|&id| matches!(graph.insn(id).op, Op::BinarySmiOp { op: SmiOpKind::Mul, .. }));
        assert!(!still_in_body);
    }

    #[test]
    fn test_loop_varying_add_stays_in_body() {
        let (mut graph, _header, body) = loop_with_invariant();
        optimize(&mut graph);
        // i + 1 depends on the loop phi and must not move.
        let add_in_body = graph
            .collect_block_insns(body)
            .iter()
            .any(|&id| matches!(graph.insn(id).op, Op::BinarySmiOp { op: SmiOpKind::Add, .. }));
        assert!(add_in_body);
    }

    #[test]
    fn test_field_load_is_not_hoisted() {
        // A static-field load inside a loop is affected by side effects and
        // stays put.
        let mut b = GraphBuilder::new(FunctionId(0), 1, 0);
        let header = b.join_block();
        let body = b.target_block();
        let exit = b.target_block();
        b.store_local(0, Val::Constant(Obj::Smi(0)));
        b.goto_(header);
        b.switch_to(header);
        let i = b.load_local(0);
        b.branch(CmpKind::Lt, i, Val::Constant(Obj::Smi(3)), body, exit);
        b.switch_to(body);
        let v = b.load_static_field(FieldId(0));
        b.store_local(0, v);
        b.goto_(header);
        b.switch_to(exit);
        let r = b.load_local(0);
        b.ret(r);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize(&mut graph);
        let load_in_body = graph
            .collect_block_insns(body)
            .iter()
            .any(|&id| matches!(graph.insn(id).op, Op::LoadStaticField { .. }));
        assert!(load_in_body);
    }
}
