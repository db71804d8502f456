//! Type-feedback application: rewrite operator calls whose recorded receiver
//! classes are all smi/smi into checked smi fast paths. The rewritten site
//! keeps the call's deopt id and environment so a failed check rolls back to
//! the state just before the call.

use crate::il::{FlowGraph, InsnId, Op, Val, Cid};
use crate::opt::{IntrinsicKind, OptimizerInfo};

pub fn apply_call_feedback(graph: &mut FlowGraph, info: &OptimizerInfo) {
    graph.compute_use_lists();
    let blocks = graph.reverse_postorder.clone();
    for block in blocks {
        for id in graph.collect_block_insns(block) {
            let (target, argc) = match graph.insn(id).op {
                Op::StaticCall { target, argc } => (target, argc),
                _ => continue,
            };
            if argc != 2 {
                continue;
            }
            let Some(&intrinsic) = info.intrinsics.get(&target) else { continue };
            let deopt_id = graph.insn(id).deopt_id.expect("call without deopt id");
            let Some(checks) = info.feedback.get(&deopt_id.0) else { continue };
            if checks.is_empty()
                || !checks.iter().all(|&(a, b)| a == Cid::Smi && b == Cid::Smi)
            {
                continue;
            }
            specialize_smi_call(graph, id, intrinsic);
        }
    }
}

/// The two immediately preceding instructions must be the call's argument
/// pushes; the graph builder emits them adjacently.
fn argument_pushes(graph: &FlowGraph, call: InsnId) -> (InsnId, InsnId) {
    let second = graph.insn(call).prev.expect("call without pushed arguments");
    let first = graph.insn(second).prev.expect("call without pushed arguments");
    debug_assert!(matches!(graph.insn(first).op, Op::PushArgument { .. }));
    debug_assert!(matches!(graph.insn(second).op, Op::PushArgument { .. }));
    (first, second)
}

fn specialize_smi_call(graph: &mut FlowGraph, call: InsnId, intrinsic: IntrinsicKind) {
    let (push_left, push_right) = argument_pushes(graph, call);
    let left = graph.insn(push_left).op.input_at(0).clone();
    let right = graph.insn(push_right).op.input_at(0).clone();
    let deopt_id = graph.insn(call).deopt_id;
    let env = graph.insn(call).env.clone();
    let is_used = graph.insn(call).is_used;

    let check_left = graph.new_insn(Op::CheckSmi { value: left.clone() });
    let check_right = graph.new_insn(Op::CheckSmi { value: right.clone() });
    let result = match intrinsic {
        IntrinsicKind::Arith(op) => {
            graph.new_insn(Op::BinarySmiOp { op, left: left.clone(), right: right.clone() })
        }
        IntrinsicKind::Compare(kind) => {
            graph.new_insn(Op::Comparison { kind, left: left.clone(), right: right.clone() })
        }
    };
    for &insn in &[check_left, check_right, result] {
        graph.insn_mut(insn).deopt_id = deopt_id;
        graph.insn_mut(insn).env = env.clone();
    }
    graph.insn_mut(result).is_used = is_used;
    if is_used {
        let ssa = graph.alloc_ssa_index();
        graph.insn_mut(result).ssa_index = Some(ssa);
    }
    graph.insert_before(call, check_left);
    graph.insert_before(call, check_right);
    graph.insert_before(call, result);
    graph.record_insn_uses(check_left);
    graph.record_insn_uses(check_right);
    graph.record_insn_uses(result);

    log::debug!(
        "specializing call {} to {}",
        call,
        graph.insn(result).op.name()
    );

    graph.replace_all_uses(call, Val::Use(result));
    graph.replace_all_uses(push_left, left);
    graph.replace_all_uses(push_right, right);
    graph.remove_from_graph(push_left);
    graph.remove_from_graph(push_right);
    graph.remove_from_graph(call);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{FunctionId, Obj, SmiOpKind};
    use hashbrown::HashMap;

    #[test]
    fn test_smi_feedback_specializes_operator_call() {
        // return add(2, 3) where add is the '+' operator stub.
        let add = FunctionId(7);
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        b.push_argument(Val::Constant(Obj::Smi(2)));
        b.push_argument(Val::Constant(Obj::Smi(3)));
        let r = b.static_call(add, 2);
        b.ret(r);
        let mut graph = b.finish();
        crate::ssa::compute_ssa(&mut graph).unwrap();

        let call_deopt = graph
            .insns
            .iter()
            .find(|i| matches!(i.op, Op::StaticCall { .. }))
            .and_then(|i| i.deopt_id)
            .unwrap();

        let mut feedback = HashMap::new();
        feedback.insert(call_deopt.0, vec![(Cid::Smi, Cid::Smi)]);
        let mut intrinsics = HashMap::new();
        intrinsics.insert(add, IntrinsicKind::Arith(SmiOpKind::Add));
        let summaries = HashMap::new();
        let info = OptimizerInfo { feedback: &feedback, intrinsics: &intrinsics, summaries: &summaries };

        apply_call_feedback(&mut graph, &info);
        assert!(graph.validate_use_lists());

        let body = graph.collect_block_insns(graph.normal_entry);
        let names: Vec<&str> = body.iter().map(|&id| graph.insn(id).op.name()).collect();
        assert_eq!(names, vec!["CheckSmi", "CheckSmi", "BinarySmiOp", "Return"]);
    }

    #[test]
    fn test_without_feedback_call_is_kept() {
        let add = FunctionId(7);
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        b.push_argument(Val::Constant(Obj::Smi(2)));
        b.push_argument(Val::Constant(Obj::Smi(3)));
        let r = b.static_call(add, 2);
        b.ret(r);
        let mut graph = b.finish();
        crate::ssa::compute_ssa(&mut graph).unwrap();

        let feedback = HashMap::new();
        let mut intrinsics = HashMap::new();
        intrinsics.insert(add, IntrinsicKind::Arith(SmiOpKind::Add));
        let summaries = HashMap::new();
        let info = OptimizerInfo { feedback: &feedback, intrinsics: &intrinsics, summaries: &summaries };
        apply_call_feedback(&mut graph, &info);

        assert!(graph
            .collect_block_insns(graph.normal_entry)
            .iter()
            .any(|&id| matches!(graph.insn(id).op, Op::StaticCall { .. })));
    }
}
