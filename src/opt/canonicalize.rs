//! Canonicalization: each definition may rewrite itself to a simpler one or
//! signal removal. Covers redundant check elimination against the propagated
//! class ids, strict-compare-with-true reduction, and constant folding of
//! overflow-free smi arithmetic.

use crate::il::{Cid, CmpKind, FlowGraph, Obj, Op, SmiOpKind, Val};

/// A folded smi result must still be taggable; reject results whose tag
/// would overflow the machine word.
fn fold_smi(op: SmiOpKind, a: i64, b: i64) -> Option<i64> {
    let result = match op {
        SmiOpKind::Add => a.checked_add(b)?,
        SmiOpKind::Sub => a.checked_sub(b)?,
        SmiOpKind::Mul => a.checked_mul(b)?,
        SmiOpKind::BitAnd => a & b,
        SmiOpKind::BitOr => a | b,
        SmiOpKind::BitXor => a ^ b,
    };
    result.checked_mul(2).map(|_| result)
}

pub fn optimize_computations(graph: &mut FlowGraph) {
    graph.compute_use_lists();
    let blocks = graph.reverse_postorder.clone();
    for block in blocks {
        for id in graph.collect_block_insns(block) {
            match graph.insn(id).op.clone() {
                Op::CheckSmi { value } => {
                    if graph.cid_of_val(&value) == Cid::Smi {
                        log::debug!("removing redundant CheckSmi {id}");
                        graph.remove_from_graph(id);
                    }
                }
                Op::CheckClass { value, cids } => {
                    let cid = graph.cid_of_val(&value);
                    if cids.len() == 1 && cid != Cid::Dynamic && cid == cids[0] {
                        log::debug!("removing redundant CheckClass {id}");
                        graph.remove_from_graph(id);
                    }
                }
                Op::Comparison { kind: CmpKind::StrictEq, left, right } => {
                    // e === true reduces to e when e is known boolean.
                    if right == Val::Constant(Obj::Bool(true))
                        && graph.cid_of_val(&left) == Cid::Bool
                    {
                        graph.replace_all_uses(id, left);
                        graph.remove_from_graph(id);
                    }
                }
                Op::BinarySmiOp { op, left, right } => {
                    if let (Some(Obj::Smi(a)), Some(Obj::Smi(b))) =
                        (left.as_constant(), right.as_constant())
                    {
                        if let Some(result) = fold_smi(op, *a, *b) {
                            graph.replace_all_uses(id, Val::Constant(Obj::Smi(result)));
                            graph.remove_from_graph(id);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::FunctionId;
    use crate::opt::typeprop;
    use crate::ssa::compute_ssa;

    #[test]
    fn test_redundant_check_smi_is_removed() {
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let x = b.binary_smi_op(SmiOpKind::Add, Val::Constant(Obj::Smi(5)), Val::Constant(Obj::Smi(7)));
        b.check_smi(x.clone());
        b.ret(x);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        typeprop::propagate_types(&mut graph);
        optimize_computations(&mut graph);

        let names: Vec<&str> = graph
            .collect_block_insns(graph.normal_entry)
            .iter()
            .map(|&id| graph.insn(id).op.name())
            .collect();
        assert!(!names.contains(&"CheckSmi"));
    }

    #[test]
    fn test_constant_smi_arithmetic_folds() {
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let x = b.binary_smi_op(SmiOpKind::Mul, Val::Constant(Obj::Smi(6)), Val::Constant(Obj::Smi(7)));
        b.ret(x);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize_computations(&mut graph);

        let body = graph.collect_block_insns(graph.normal_entry);
        assert_eq!(body.len(), 1);
        assert_eq!(graph.insn(body[0]).op.input_at(0), &Val::Constant(Obj::Smi(42)));
    }

    #[test]
    fn test_overflowing_fold_is_kept() {
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let x = b.binary_smi_op(
            SmiOpKind::Mul,
            Val::Constant(Obj::Smi(i64::MAX / 2)),
            Val::Constant(Obj::Smi(4)),
        );
        b.ret(x);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize_computations(&mut graph);
        let body = graph.collect_block_insns(graph.normal_entry);
        assert!(matches!(graph.insn(body[0]).op, Op::BinarySmiOp { .. }));
    }
}
