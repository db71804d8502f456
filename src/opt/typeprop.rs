//! Forward type propagation: refine each definition's propagated class id to
//! a fixpoint over reverse postorder. Propagation is optimistic (unvisited
//! definitions contribute nothing to a join) and monotone: a cid, once set,
//! is only ever confirmed or widened to Dynamic, never narrowed. Soundness
//! rule: the cache must never claim a more specific class than execution
//! guarantees, since check elimination trusts it.

use crate::il::{Cid, FlowGraph, InsnId, Op, Val};

fn optimistic_cid(graph: &FlowGraph, val: &Val) -> Option<Cid> {
    match val {
        Val::Constant(obj) => Some(obj.cid()),
        Val::Use(id) => graph.insn(*id).propagated_cid,
    }
}

fn join(a: Option<Cid>, b: Option<Cid>) -> Option<Cid> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(x), Some(y)) if x == y => Some(x),
        _ => Some(Cid::Dynamic),
    }
}

fn result_cid(graph: &FlowGraph, id: InsnId) -> Option<Cid> {
    match &graph.insn(id).op {
        Op::Parameter { .. } => Some(Cid::Dynamic),
        Op::BinarySmiOp { .. } => Some(Cid::Smi),
        Op::Comparison { .. } => Some(Cid::Bool),
        Op::StaticCall { .. } | Op::LoadStaticField { .. } => Some(Cid::Dynamic),
        Op::PushArgument { value } => optimistic_cid(graph, value),
        Op::Phi { inputs } => {
            inputs.iter().fold(None, |acc, input| join(acc, optimistic_cid(graph, input)))
        }
        _ => None,
    }
}

pub fn propagate_types(graph: &mut FlowGraph) {
    loop {
        let mut changed = false;
        let blocks = graph.reverse_postorder.clone();
        for block in blocks {
            if let Some(phis) = graph.block(block).phis.clone() {
                for phi in phis.into_iter().flatten() {
                    if let Some(cid) = result_cid(graph, phi) {
                        changed |= graph.insn_mut(phi).set_propagated_cid(cid);
                    }
                }
            }
            for id in graph.collect_block_insns(block) {
                if let Some(cid) = result_cid(graph, id) {
                    changed |= graph.insn_mut(id).set_propagated_cid(cid);
                }
            }
        }
        // Parameters live outside any body; type them once.
        for index in 0..graph.insns.len() {
            let id = InsnId(index as u32);
            if matches!(graph.insn(id).op, Op::Parameter { .. }) {
                changed |= graph.insn_mut(id).set_propagated_cid(Cid::Dynamic);
            }
        }
        if !changed {
            break;
        }
    }
}
