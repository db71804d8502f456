// This module hosts the optimizer passes that run between SSA construction and
// register allocation. Each pass is a graph-to-graph transformation, independently
// gated by a flag, applied in a fixed pipeline order: type-feedback application,
// inlining, type propagation, canonicalization, dominator-scoped CSE, then LICM.
// Passes recompute the use-list multimap at their boundary and keep it coherent
// through replace_all_uses while they edit the graph.

pub mod canonicalize;
pub mod cse;
pub mod feedback;
pub mod inline;
pub mod licm;
pub mod typeprop;

use crate::flags::Flags;
use crate::il::{Cid, CmpKind, FlowGraph, FunctionId, Obj, SmiOpKind};
use hashbrown::HashMap;

/// Operator fast paths the optimizer may specialize a call into. Left shift,
/// division and modulo are intentionally absent: those operators keep their
/// generic call path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntrinsicKind {
    Arith(SmiOpKind),
    Compare(CmpKind),
}

/// Inlining summary the front end records for trivial leaf functions.
#[derive(Clone, Debug, PartialEq)]
pub enum InlineSummary {
    ReturnConstant(Obj),
    ReturnParameter(usize),
}

/// Read-only registry facts the passes consult: per-call-site receiver-class
/// feedback (keyed by the call's deopt id), operator intrinsics, and inline
/// summaries.
pub struct OptimizerInfo<'a> {
    pub feedback: &'a HashMap<u32, Vec<(Cid, Cid)>>,
    pub intrinsics: &'a HashMap<FunctionId, IntrinsicKind>,
    pub summaries: &'a HashMap<FunctionId, InlineSummary>,
}

impl OptimizerInfo<'_> {
    pub fn empty() -> OptimizerInfo<'static> {
        use std::sync::OnceLock;
        static FEEDBACK: OnceLock<HashMap<u32, Vec<(Cid, Cid)>>> = OnceLock::new();
        static INTRINSICS: OnceLock<HashMap<FunctionId, IntrinsicKind>> = OnceLock::new();
        static SUMMARIES: OnceLock<HashMap<FunctionId, InlineSummary>> = OnceLock::new();
        OptimizerInfo {
            feedback: FEEDBACK.get_or_init(HashMap::new),
            intrinsics: INTRINSICS.get_or_init(HashMap::new),
            summaries: SUMMARIES.get_or_init(HashMap::new),
        }
    }
}

/// Run the optimization pipeline over an SSA graph.
pub fn optimize_graph(graph: &mut FlowGraph, flags: &Flags, info: &OptimizerInfo) {
    feedback::apply_call_feedback(graph, info);
    if flags.use_inlining {
        inline::try_inline_calls(graph, info);
    }
    typeprop::propagate_types(graph);
    canonicalize::optimize_computations(graph);
    if flags.cse {
        cse::optimize(graph);
    }
    if flags.licm {
        licm::optimize(graph);
    }
}
