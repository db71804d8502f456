//! Trivial-leaf inlining: calls to functions whose body reduces to returning
//! a constant or a parameter are replaced by the value itself; the call and
//! its argument pushes disappear from the graph.

use crate::il::{FlowGraph, InsnId, Op, Val};
use crate::opt::{InlineSummary, OptimizerInfo};

pub fn try_inline_calls(graph: &mut FlowGraph, info: &OptimizerInfo) {
    graph.compute_use_lists();
    let blocks = graph.reverse_postorder.clone();
    for block in blocks {
        for id in graph.collect_block_insns(block) {
            let (target, argc) = match graph.insn(id).op {
                Op::StaticCall { target, argc } => (target, argc),
                _ => continue,
            };
            let Some(summary) = info.summaries.get(&target).cloned() else { continue };
            inline_call(graph, id, argc, &summary);
        }
    }
}

fn inline_call(graph: &mut FlowGraph, call: InsnId, argc: usize, summary: &InlineSummary) {
    // Collect the call's argument pushes, first-pushed first.
    let mut pushes: Vec<InsnId> = Vec::with_capacity(argc);
    let mut cursor = call;
    for _ in 0..argc {
        let prev = graph.insn(cursor).prev.expect("call without pushed arguments");
        debug_assert!(matches!(graph.insn(prev).op, Op::PushArgument { .. }));
        pushes.push(prev);
        cursor = prev;
    }
    pushes.reverse();

    let replacement = match summary {
        InlineSummary::ReturnConstant(obj) => Val::Constant(obj.clone()),
        InlineSummary::ReturnParameter(index) => {
            graph.insn(pushes[*index]).op.input_at(0).clone()
        }
    };

    log::debug!("inlining call {call} as {replacement:?}");

    graph.replace_all_uses(call, replacement);
    for push in pushes {
        let value = graph.insn(push).op.input_at(0).clone();
        graph.replace_all_uses(push, value);
        graph.remove_from_graph(push);
    }
    graph.remove_from_graph(call);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{FunctionId, Obj};
    use hashbrown::HashMap;
    use crate::opt::OptimizerInfo;

    #[test]
    fn test_return_parameter_summary_inlines_identity_call() {
        let identity = FunctionId(3);
        let mut b = GraphBuilder::new(FunctionId(0), 1, 1);
        let x = b.load_local(0);
        b.push_argument(x);
        let r = b.static_call(identity, 1);
        b.ret(r);
        let mut graph = b.finish();
        crate::ssa::compute_ssa(&mut graph).unwrap();

        let feedback = HashMap::new();
        let intrinsics = HashMap::new();
        let mut summaries = HashMap::new();
        summaries.insert(identity, InlineSummary::ReturnParameter(0));
        let info = OptimizerInfo { feedback: &feedback, intrinsics: &intrinsics, summaries: &summaries };
        try_inline_calls(&mut graph, &info);
        assert!(graph.validate_use_lists());

        let body = graph.collect_block_insns(graph.normal_entry);
        assert_eq!(body.len(), 1);
        let ret = body[0];
        // The return now consumes the parameter definition directly.
        let param = graph.insn(ret).op.input_at(0).as_use().unwrap();
        assert!(matches!(graph.insn(param).op, Op::Parameter { index: 0 }));
    }

    #[test]
    fn test_return_constant_summary_inlines_call() {
        let answer = FunctionId(4);
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let r = b.static_call(answer, 0);
        b.ret(r);
        let mut graph = b.finish();
        crate::ssa::compute_ssa(&mut graph).unwrap();

        let feedback = HashMap::new();
        let intrinsics = HashMap::new();
        let mut summaries = HashMap::new();
        summaries.insert(answer, InlineSummary::ReturnConstant(Obj::Smi(42)));
        let info = OptimizerInfo { feedback: &feedback, intrinsics: &intrinsics, summaries: &summaries };
        try_inline_calls(&mut graph, &info);

        let body = graph.collect_block_insns(graph.normal_entry);
        assert_eq!(body.len(), 1);
        assert_eq!(graph.insn(body[0]).op.input_at(0), &Val::Constant(Obj::Smi(42)));
    }
}
