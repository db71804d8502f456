// Dominator-based common subexpression elimination. A recursive walk over the
// dominator tree carries a value-numbering table keyed on the instruction kind, the
// SSA indices of use operands (constants contribute their value), and kind-specific
// attributes. The table is copied for all but the last dominated child, so numbering
// never escapes a dominance scope. Static-field loads participate through a memory
// epoch that every side-effecting instruction bumps: two loads of the same field
// only match when no store or call was walked between them.

use crate::il::{FlowGraph, InsnId, Obj, Op, SmiOpKind, CmpKind, FieldId, Val};
use hashbrown::HashMap;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum OperandKey {
    Ssa(u32),
    Smi(i64),
    Bool(bool),
    Null,
    /// Doubles are keyed by bit pattern.
    Double(u64),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum CseKey {
    Arith(SmiOpKind, OperandKey, OperandKey),
    Compare(CmpKind, OperandKey, OperandKey),
    FieldLoad(FieldId, u64),
}

fn operand_key(graph: &FlowGraph, val: &Val) -> OperandKey {
    match val {
        Val::Use(id) => {
            OperandKey::Ssa(graph.insn(*id).ssa_index.expect("CSE before renaming"))
        }
        Val::Constant(Obj::Smi(v)) => OperandKey::Smi(*v),
        Val::Constant(Obj::Bool(b)) => OperandKey::Bool(*b),
        Val::Constant(Obj::Null) => OperandKey::Null,
        Val::Constant(Obj::Double(d)) => OperandKey::Double(d.to_bits()),
    }
}

fn cse_key(graph: &FlowGraph, id: InsnId, epoch: u64) -> Option<CseKey> {
    match &graph.insn(id).op {
        Op::BinarySmiOp { op, left, right } => Some(CseKey::Arith(
            *op,
            operand_key(graph, left),
            operand_key(graph, right),
        )),
        Op::Comparison { kind, left, right } => Some(CseKey::Compare(
            *kind,
            operand_key(graph, left),
            operand_key(graph, right),
        )),
        Op::LoadStaticField { field } => Some(CseKey::FieldLoad(*field, epoch)),
        _ => None,
    }
}

pub fn optimize(graph: &mut FlowGraph) {
    graph.compute_use_lists();
    let entry = graph.graph_entry;
    let mut map: HashMap<CseKey, InsnId> = HashMap::new();
    let mut epoch = 0u64;
    optimize_recursive(graph, entry, &mut map, &mut epoch);
}

fn optimize_recursive(
    graph: &mut FlowGraph,
    block: crate::il::BlockId,
    map: &mut HashMap<CseKey, InsnId>,
    epoch: &mut u64,
) {
    for id in graph.collect_block_insns(block) {
        if graph.insn(id).op.has_side_effect() {
            *epoch += 1;
            continue;
        }
        let Some(key) = cse_key(graph, id, *epoch) else { continue };
        match map.get(&key) {
            Some(&existing) => {
                log::debug!(
                    "CSE: replacing v{} with v{}",
                    graph.insn(id).ssa_index.unwrap_or(0),
                    graph.insn(existing).ssa_index.unwrap_or(0)
                );
                graph.replace_all_uses(id, Val::Use(existing));
                graph.remove_from_graph(id);
            }
            None => {
                map.insert(key, id);
            }
        }
    }

    // Children in the dominator tree; the map is copied for all but the
    // last child.
    let children = graph.block(block).dominated.clone();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        if i + 1 < count {
            let mut child_map = map.clone();
            optimize_recursive(graph, child, &mut child_map, epoch);
        } else {
            optimize_recursive(graph, child, map, epoch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{FunctionId, SmiOpKind};
    use crate::ssa::compute_ssa;

    #[test]
    fn test_twin_field_loads_collapse_without_intervening_store() {
        let field = FieldId(1);
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let a = b.load_static_field(field);
        let c = b.load_static_field(field);
        let sum = b.binary_smi_op(SmiOpKind::Add, a, c);
        b.ret(sum);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize(&mut graph);

        let loads = graph
            .collect_block_insns(graph.normal_entry)
            .iter()
            .filter(|&&id| matches!(graph.insn(id).op, Op::LoadStaticField { .. }))
            .count();
        assert_eq!(loads, 1);
        // Both operands of the sum reference the surviving load.
        let body = graph.collect_block_insns(graph.normal_entry);
        let sum_id = body
            .iter()
            .copied()
            .find(|&id| matches!(graph.insn(id).op, Op::BinarySmiOp { .. }))
            .unwrap();
        let left = graph.insn(sum_id).op.input_at(0).clone();
        let right = graph.insn(sum_id).op.input_at(1).clone();
        assert_eq!(left, right);
    }

    #[test]
    fn test_intervening_store_blocks_field_load_cse() {
        let field = FieldId(1);
        let mut b = GraphBuilder::new(FunctionId(0), 0, 0);
        let a = b.load_static_field(field);
        b.store_static_field(field, Val::Constant(crate::il::Obj::Smi(9)));
        let c = b.load_static_field(field);
        let sum = b.binary_smi_op(SmiOpKind::Add, a, c);
        b.ret(sum);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize(&mut graph);

        let loads = graph
            .collect_block_insns(graph.normal_entry)
            .iter()
            .filter(|&&id| matches!(graph.insn(id).op, Op::LoadStaticField { .. }))
            .count();
        assert_eq!(loads, 2);
    }

    #[test]
    fn test_structurally_equal_arithmetic_collapses() {
        let mut b = GraphBuilder::new(FunctionId(0), 1, 1);
        let x = b.load_local(0);
        let a = b.binary_smi_op(SmiOpKind::Add, x.clone(), Val::Constant(crate::il::Obj::Smi(1)));
        let c = b.binary_smi_op(SmiOpKind::Add, x, Val::Constant(crate::il::Obj::Smi(1)));
        let sum = b.binary_smi_op(SmiOpKind::Mul, a, c);
        b.ret(sum);
        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        optimize(&mut graph);

        let adds = graph
            .collect_block_insns(graph.normal_entry)
            .iter()
            .filter(|&&id| {
                matches!(graph.insn(id).op, Op::BinarySmiOp { op: SmiOpKind::Add, .. })
            })
            .count();
        assert_eq!(adds, 1);
        assert!(graph.validate_use_lists());
    }
}
