// This module performs SSA construction on a graph whose dominator tree has been
// computed: minimal phi insertion over iterated dominance frontiers, then a single
// recursive renaming descent over the dominator tree that retires LoadLocal/StoreLocal
// pseudo-ops, binds phi inputs along join edges, attaches deoptimization environments,
// and assigns SSA indices (once, monotonically, never reused). Phi liveness is seeded
// by non-environment loads and propagated transitively afterwards; dead phis are then
// physically removed.

use crate::bitset::BitVector;
use crate::error::Bailout;
use crate::il::{BlockId, Environment, FlowGraph, InsnId, Obj, Op, Val};
use hashbrown::HashMap;

/// Insert minimal phis: for each variable, seed a worklist with the blocks
/// assigning it and propagate through dominance frontiers. The
/// `has_already`/`work` high-water marks (highest variable index seen) avoid
/// quadratic re-insertion.
pub fn insert_phis(graph: &mut FlowGraph, dom_frontier: &[BitVector]) {
    let block_count = graph.preorder.len();
    let variable_count = graph.variable_count;
    let mut has_already: Vec<isize> = vec![-1; block_count];
    let mut work: Vec<isize> = vec![-1; block_count];

    let mut worklist: Vec<BlockId> = Vec::new();
    for var_index in 0..variable_count {
        for block_index in 0..block_count {
            if graph.assigned_vars[block_index].contains(var_index) {
                work[block_index] = var_index as isize;
                worklist.push(graph.preorder[block_index]);
            }
        }

        while let Some(current) = worklist.pop() {
            let current_index = graph.block(current).preorder_number as usize;
            let frontier: Vec<usize> = dom_frontier[current_index].iter().collect();
            for index in frontier {
                if has_already[index] < var_index as isize {
                    let block = graph.preorder[index];
                    debug_assert!(graph.block(block).is_join());
                    insert_phi(graph, block, var_index);
                    has_already[index] = var_index as isize;
                    if work[index] < var_index as isize {
                        work[index] = var_index as isize;
                        worklist.push(block);
                    }
                }
            }
        }
    }
}

fn insert_phi(graph: &mut FlowGraph, block: BlockId, var_index: usize) {
    let pred_count = graph.block(block).preds.len();
    let variable_count = graph.variable_count;
    let phi = graph.new_insn(Op::Phi {
        inputs: vec![Val::Constant(Obj::Null); pred_count],
    });
    graph.insn_mut(phi).block = Some(block);
    graph.insn_mut(phi).is_used = true;
    let data = graph.block_mut(block);
    let phis = data.phis.get_or_insert_with(|| vec![None; variable_count]);
    debug_assert!(phis[var_index].is_none());
    phis[var_index] = Some(phi);
    data.phi_count += 1;
}

/// Rename variable accesses into SSA definitions. Returns a bailout for
/// graph shapes the SSA builder does not support.
pub fn rename(graph: &mut FlowGraph) -> Result<(), Bailout> {
    if !graph.catch_entries.is_empty() {
        return Err(Bailout::new("catch-entry support in SSA"));
    }

    // Start environment: parameters bound to fresh definitions, every other
    // local starts as #null.
    let mut start_env: Vec<Val> = Vec::with_capacity(graph.variable_count);
    for index in 0..graph.parameter_count {
        let param = graph.new_insn(Op::Parameter { index });
        let entry = graph.graph_entry;
        let ssa = graph.alloc_ssa_index();
        let data = graph.insn_mut(param);
        data.block = Some(entry);
        data.is_used = true;
        data.ssa_index = Some(ssa);
        start_env.push(Val::Use(param));
    }
    while start_env.len() < graph.variable_count {
        start_env.push(Val::Constant(Obj::Null));
    }
    graph.start_env =
        Some(Environment::new(start_env.clone(), graph.fixed_parameter_count));

    let mut live_phis: Vec<InsnId> = Vec::new();
    let mut retired: HashMap<InsnId, Val> = HashMap::new();
    let normal_entry = graph.normal_entry;
    let mut env = start_env;
    let mut args: Vec<Val> = Vec::new();
    rename_recursive(graph, normal_entry, &mut env, &mut args, &mut live_phis, &mut retired);

    mark_live_phis(graph, live_phis);
    remove_dead_phis(graph);
    Ok(())
}

fn rename_recursive(
    graph: &mut FlowGraph,
    block: BlockId,
    env: &mut Vec<Val>,
    args: &mut Vec<Val>,
    live_phis: &mut Vec<InsnId>,
    retired: &mut HashMap<InsnId, Val>,
) {
    // 1. Phis bind their environment slot and get a fresh SSA index.
    if let Some(phis) = graph.block(block).phis.clone() {
        for (var_index, slot) in phis.iter().enumerate() {
            if let Some(phi) = slot {
                let ssa = graph.alloc_ssa_index();
                graph.insn_mut(*phi).ssa_index = Some(ssa);
                env[var_index] = Val::Use(*phi);
            }
        }
    }

    // 2. Straight-line body.
    for id in graph.collect_block_insns(block) {
        // 2a. Rewire operands whose defining LoadLocal/StoreLocal has been
        // retired; the retired value is copied, preserving the one-owner-
        // per-slot use discipline.
        for i in 0..graph.insn(id).op.input_count() {
            if let Val::Use(def) = graph.insn(id).op.input_at(i) {
                if let Some(replacement) = retired.get(def) {
                    let replacement = replacement.clone();
                    graph.insn_mut(id).op.set_input_at(i, replacement);
                }
            }
        }

        // Snapshot the abstract state: locals plus pending call arguments.
        let snapshot: Vec<Val> = env.iter().cloned().chain(args.iter().cloned()).collect();
        graph.insn_mut(id).env =
            Some(Environment::new(snapshot, graph.fixed_parameter_count));

        match graph.insn(id).op.clone() {
            Op::LoadLocal { index } => {
                let value = env[index].clone();
                if let Val::Use(def) = &value {
                    let def = *def;
                    if matches!(graph.insn(def).op, Op::Phi { .. })
                        && !graph.insn(def).is_alive
                    {
                        graph.insn_mut(def).is_alive = true;
                        live_phis.push(def);
                    }
                }
                if graph.insn(id).is_used {
                    retired.insert(id, value);
                }
                graph.remove_from_graph(id);
            }
            Op::StoreLocal { index, .. } => {
                // Input 0 has already been rewired above.
                let value = graph.insn(id).op.input_at(0).clone();
                env[index] = value.clone();
                if graph.insn(id).is_used {
                    retired.insert(id, value);
                }
                graph.remove_from_graph(id);
            }
            Op::PushArgument { .. } => {
                args.push(Val::Use(id));
            }
            Op::StaticCall { argc, .. } => {
                debug_assert!(args.len() >= argc, "call arity exceeds pushed arguments");
                args.truncate(args.len() - argc);
                if graph.insn(id).is_used {
                    let ssa = graph.alloc_ssa_index();
                    graph.insn_mut(id).ssa_index = Some(ssa);
                }
            }
            op if op.is_definition() => {
                if graph.insn(id).is_used {
                    let ssa = graph.alloc_ssa_index();
                    graph.insn_mut(id).ssa_index = Some(ssa);
                }
            }
            _ => {}
        }
    }

    // 3. Dominated blocks see a copy of the environment so that siblings do
    // not observe each other's renaming.
    for child in graph.block(block).dominated.clone() {
        let mut child_env = env.clone();
        let mut child_args = args.clone();
        rename_recursive(graph, child, &mut child_env, &mut child_args, live_phis, retired);
    }

    // 4. Fill phi operands along the edge to a join successor. Edge-split
    // form guarantees the join is reached by a goto.
    if let Some(last) = graph.block(block).last {
        if let Op::Goto { target } = graph.insn(last).op {
            if graph.block(target).is_join() {
                let pred_index = graph
                    .block(target)
                    .index_of_predecessor(block)
                    .expect("goto target does not record predecessor");
                if let Some(phis) = graph.block(target).phis.clone() {
                    for (var_index, slot) in phis.iter().enumerate() {
                        if let Some(phi) = slot {
                            graph
                                .insn_mut(*phi)
                                .op
                                .set_input_at(pred_index, env[var_index].clone());
                        }
                    }
                }
            }
        }
    }
}

/// Propagate the alive mark transitively through phi operand chains.
fn mark_live_phis(graph: &mut FlowGraph, mut live_phis: Vec<InsnId>) {
    while let Some(phi) = live_phis.pop() {
        let inputs = match &graph.insn(phi).op {
            Op::Phi { inputs } => inputs.clone(),
            _ => unreachable!("live phi worklist holds a non-phi"),
        };
        for input in inputs {
            if let Val::Use(def) = input {
                if matches!(graph.insn(def).op, Op::Phi { .. }) && !graph.insn(def).is_alive {
                    graph.insn_mut(def).is_alive = true;
                    live_phis.push(def);
                }
            }
        }
    }
}

/// Drop phis that never became alive; collapse the sparse array when a block
/// ends up phi-free.
fn remove_dead_phis(graph: &mut FlowGraph) {
    for block_index in 0..graph.blocks.len() {
        let block = BlockId(block_index as u32);
        let Some(phis) = graph.block(block).phis.clone() else { continue };
        let mut kept = 0;
        let mut new_phis = phis.clone();
        for slot in new_phis.iter_mut() {
            if let Some(phi) = slot {
                if graph.insn(*phi).is_alive {
                    kept += 1;
                } else {
                    graph.insn_mut(*phi).block = None;
                    *slot = None;
                }
            }
        }
        let data = graph.block_mut(block);
        data.phi_count = kept;
        data.phis = if kept == 0 { None } else { Some(new_phis) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::builder::GraphBuilder;
    use crate::il::{CmpKind, FunctionId};
    use crate::ssa::compute_ssa;

    fn count_phis(graph: &FlowGraph) -> usize {
        graph.blocks.iter().map(|b| b.phi_count).sum()
    }

    fn ssa_indices(graph: &FlowGraph) -> Vec<u32> {
        graph.insns.iter().filter_map(|insn| insn.ssa_index).collect()
    }

    #[test]
    fn test_diamond_with_join_gets_exactly_one_phi() {
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let t = b.target_block();
        let f = b.target_block();
        let join = b.join_block();
        let x = b.load_local(0);
        b.branch(CmpKind::Ne, x, Val::Constant(Obj::Smi(0)), t, f);
        b.switch_to(t);
        b.store_local(1, Val::Constant(Obj::Smi(1)));
        b.goto_(join);
        b.switch_to(f);
        b.store_local(1, Val::Constant(Obj::Smi(2)));
        b.goto_(join);
        b.switch_to(join);
        let v = b.load_local(1);
        b.ret(v);

        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();

        assert_eq!(count_phis(&graph), 1);
        let join_block = graph.block(join);
        let phis = join_block.phis.as_ref().unwrap();
        let phi = phis[1].expect("phi for variable 1");
        match &graph.insn(phi).op {
            Op::Phi { inputs } => {
                assert_eq!(inputs.len(), 2);
                assert!(inputs.contains(&Val::Constant(Obj::Smi(1))));
                assert!(inputs.contains(&Val::Constant(Obj::Smi(2))));
            }
            other => panic!("expected phi, got {}", other.name()),
        }
        // The return consumes the phi.
        let ret = graph.block(join).last.unwrap();
        assert_eq!(graph.insn(ret).op.input_at(0), &Val::Use(phi));
    }

    #[test]
    fn test_each_ssa_index_is_assigned_exactly_once() {
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let t = b.target_block();
        let f = b.target_block();
        let join = b.join_block();
        let x = b.load_local(0);
        b.branch(CmpKind::Ne, x, Val::Constant(Obj::Smi(0)), t, f);
        b.switch_to(t);
        b.store_local(1, Val::Constant(Obj::Smi(1)));
        b.goto_(join);
        b.switch_to(f);
        b.store_local(1, Val::Constant(Obj::Smi(2)));
        b.goto_(join);
        b.switch_to(join);
        let v = b.load_local(1);
        b.ret(v);

        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();

        let mut indices = ssa_indices(&graph);
        indices.sort_unstable();
        let mut deduped = indices.clone();
        deduped.dedup();
        assert_eq!(indices, deduped, "duplicate SSA index assigned");
        assert!(indices.len() as u32 <= graph.current_ssa_temp_index);
    }

    #[test]
    fn test_three_predecessor_join_phi_inputs_align_with_predecessors() {
        // Two chained diamonds feeding one join with three predecessors,
        // each arm storing a distinct constant.
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let t1 = b.target_block();
        let f1 = b.target_block();
        let t2 = b.target_block();
        let f2 = b.target_block();
        let join = b.join_block();

        let x = b.load_local(0);
        b.branch(CmpKind::Eq, x, Val::Constant(Obj::Smi(1)), t1, f1);

        b.switch_to(t1);
        b.store_local(1, Val::Constant(Obj::Smi(10)));
        b.goto_(join);

        b.switch_to(f1);
        let x2 = b.load_local(0);
        b.branch(CmpKind::Eq, x2, Val::Constant(Obj::Smi(2)), t2, f2);

        b.switch_to(t2);
        b.store_local(1, Val::Constant(Obj::Smi(20)));
        b.goto_(join);

        b.switch_to(f2);
        b.store_local(1, Val::Constant(Obj::Smi(30)));
        b.goto_(join);

        b.switch_to(join);
        let v = b.load_local(1);
        b.ret(v);

        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();

        let join_block = graph.block(join).clone();
        assert_eq!(join_block.preds.len(), 3);
        let phi = join_block.phis.as_ref().unwrap()[1].expect("phi for variable 1");
        let inputs = match &graph.insn(phi).op {
            Op::Phi { inputs } => inputs.clone(),
            other => panic!("expected phi, got {}", other.name()),
        };
        assert_eq!(inputs.len(), 3);

        // Input i must be the constant stored along predecessor i.
        for (i, &pred) in join_block.preds.iter().enumerate() {
            let expected = match pred {
                p if p == t1 => Obj::Smi(10),
                p if p == t2 => Obj::Smi(20),
                p if p == f2 => Obj::Smi(30),
                other => panic!("unexpected predecessor {other}"),
            };
            assert_eq!(inputs[i], Val::Constant(expected));
        }
    }

    #[test]
    fn test_dead_phi_is_removed() {
        // Variable 1 is assigned in both arms but never read afterwards.
        let mut b = GraphBuilder::new(FunctionId(0), 2, 1);
        let t = b.target_block();
        let f = b.target_block();
        let join = b.join_block();
        let x = b.load_local(0);
        b.branch(CmpKind::Ne, x, Val::Constant(Obj::Smi(0)), t, f);
        b.switch_to(t);
        b.store_local(1, Val::Constant(Obj::Smi(1)));
        b.goto_(join);
        b.switch_to(f);
        b.store_local(1, Val::Constant(Obj::Smi(2)));
        b.goto_(join);
        b.switch_to(join);
        b.ret(Val::Constant(Obj::Smi(0)));

        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        assert_eq!(count_phis(&graph), 0);
        assert!(graph.block(join).phis.is_none());
    }

    #[test]
    fn test_catch_entry_bails_out() {
        let mut b = GraphBuilder::new(FunctionId(0), 1, 0);
        let catch = b.catch_block();
        b.ret(Val::Constant(Obj::Smi(0)));
        b.switch_to(catch);
        b.ret(Val::Constant(Obj::Null));
        let mut graph = b.finish();
        let err = compute_ssa(&mut graph).unwrap_err();
        assert!(err.reason.contains("catch-entry"));
    }

    #[test]
    fn test_loop_carried_phi_stays_alive() {
        // i = 0; while (i < 3) { i = i + 1 } return i
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
        let i2 = b.load_local(0);
        let next = b.binary_smi_op(crate::il::SmiOpKind::Add, i2, Val::Constant(Obj::Smi(1)));
        b.store_local(0, next);
        b.goto_(header);
        b.switch_to(exit);
        let r = b.load_local(0);
        b.ret(r);

        let mut graph = b.finish();
        compute_ssa(&mut graph).unwrap();
        assert_eq!(count_phis(&graph), 1);
        let phi = graph.block(header).phis.as_ref().unwrap()[0].unwrap();
        assert!(graph.insn(phi).is_alive);
        // The phi's loop input is the incremented value.
        let inputs = match &graph.insn(phi).op {
            Op::Phi { inputs } => inputs.clone(),
            _ => unreachable!(),
        };
        assert!(inputs.iter().any(|v| v == &Val::Constant(Obj::Smi(0))));
        assert!(inputs.iter().any(|v| matches!(v, Val::Use(_))));
    }
}
