// This module is the raw-CFG construction surface consumed by the front end's graph
// producer (and by the tests and the ilview tool). It appends instructions to the
// current block, allocates target/join entries, enforces edge-split form (branch
// successors must be target entries) and assigns each emitted instruction a fresh
// deopt id, monotonically per compile attempt. The builder knows nothing about the
// source language; it hands out a discovered FlowGraph ready for compilation.

use crate::il::{
    BlockId, BlockKind, CmpKind, FieldId, FlowGraph, FunctionId, InsnId, Obj, Op, SmiOpKind, Val,
    DeoptId,
};
use crate::ssa;

pub struct GraphBuilder {
    graph: FlowGraph,
    current: Option<BlockId>,
    next_deopt_id: u32,
}

impl GraphBuilder {
    pub fn new(function: FunctionId, variable_count: usize, parameter_count: usize) -> Self {
        let graph = FlowGraph::new(function, variable_count, parameter_count);
        let entry = graph.normal_entry;
        Self { graph, current: Some(entry), next_deopt_id: 0 }
    }

    pub fn target_block(&mut self) -> BlockId {
        self.graph.alloc_block(BlockKind::TargetEntry)
    }

    pub fn join_block(&mut self) -> BlockId {
        self.graph.alloc_block(BlockKind::JoinEntry)
    }

    pub fn catch_block(&mut self) -> BlockId {
        let block = self.graph.alloc_block(BlockKind::CatchEntry);
        self.graph.catch_entries.push(block);
        block
    }

    pub fn switch_to(&mut self, block: BlockId) {
        debug_assert!(self.graph.block(block).last.is_none(), "block already terminated");
        self.current = Some(block);
    }

    fn emit(&mut self, op: Op, is_used: bool) -> InsnId {
        let block = self.current.expect("no current block");
        let insn = self.graph.new_insn(op);
        self.graph.insn_mut(insn).deopt_id = Some(DeoptId(self.next_deopt_id));
        self.next_deopt_id += 1;
        self.graph.insn_mut(insn).is_used = is_used;
        self.graph.append(block, insn);
        if self.graph.insn(insn).op.is_control() {
            self.current = None;
        }
        insn
    }

    pub fn load_local(&mut self, index: usize) -> Val {
        Val::Use(self.emit(Op::LoadLocal { index }, true))
    }

    pub fn store_local(&mut self, index: usize, value: Val) {
        self.emit(Op::StoreLocal { index, value }, false);
    }

    pub fn binary_smi_op(&mut self, op: SmiOpKind, left: Val, right: Val) -> Val {
        Val::Use(self.emit(Op::BinarySmiOp { op, left, right }, true))
    }

    pub fn comparison(&mut self, kind: CmpKind, left: Val, right: Val) -> Val {
        Val::Use(self.emit(Op::Comparison { kind, left, right }, true))
    }

    pub fn check_smi(&mut self, value: Val) {
        self.emit(Op::CheckSmi { value }, false);
    }

    pub fn load_static_field(&mut self, field: FieldId) -> Val {
        Val::Use(self.emit(Op::LoadStaticField { field }, true))
    }

    pub fn store_static_field(&mut self, field: FieldId, value: Val) {
        self.emit(Op::StoreStaticField { field, value }, false);
    }

    pub fn push_argument(&mut self, value: Val) {
        self.emit(Op::PushArgument { value }, false);
    }

    /// Emits the call consuming the `argc` most recently pushed arguments.
    pub fn static_call(&mut self, target: FunctionId, argc: usize) -> Val {
        Val::Use(self.emit(Op::StaticCall { target, argc }, true))
    }

    /// Effect-only call (result discarded).
    pub fn static_call_unused(&mut self, target: FunctionId, argc: usize) {
        self.emit(Op::StaticCall { target, argc }, false);
    }

    pub fn goto_(&mut self, target: BlockId) {
        self.emit(Op::Goto { target }, false);
    }

    pub fn branch(
        &mut self,
        kind: CmpKind,
        left: Val,
        right: Val,
        true_target: BlockId,
        false_target: BlockId,
    ) {
        debug_assert!(
            self.graph.block(true_target).kind == BlockKind::TargetEntry
                && self.graph.block(false_target).kind == BlockKind::TargetEntry,
            "branch successors must be target entries (edge-split form)"
        );
        self.emit(Op::Branch { kind, left, right, true_target, false_target }, false);
    }

    pub fn ret(&mut self, value: Val) {
        self.emit(Op::Return { value }, false);
    }

    pub fn constant(&self, obj: Obj) -> Val {
        Val::Constant(obj)
    }

    /// Finish construction: discover blocks and hand out the graph.
    pub fn finish(mut self) -> FlowGraph {
        ssa::discover_blocks(&mut self.graph);
        self.graph
    }
}
