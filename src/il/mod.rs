// This module defines the IL instruction graph: the typed node graph representing one
// function body between graph building and code generation. Instructions live in an
// index-stable arena owned by the FlowGraph; ordinary instructions within a block are
// doubly linked through optional arena indices, while block entries, phis and the
// terminating control instruction are not chained like ordinary instructions. Operand
// values are either uses of a producing instruction or embedded immutable constants.
// Use lists are kept as an explicit multimap from definition to (consumer, slot) pairs,
// split into input uses and environment uses; every graph edit must preserve the
// bijection between that record and the operand slots actually referencing the
// definition. The module also carries the per-definition optimizer caches (propagated
// class id, SSA index, use kind) and the deopt bookkeeping (deopt id, environment).

pub mod block;
pub mod builder;
pub mod env;
pub mod printer;

use crate::bitset::BitVector;
pub use block::{BlockData, BlockKind};
pub use env::Environment;

use std::fmt;

/// Index of an instruction in a function's instruction arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct InsnId(pub u32);

impl InsnId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Index of a block in a function's block arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Deoptimization point identifier, assigned monotonically per compile attempt.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeoptId(pub u32);

impl fmt::Display for DeoptId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Identifier of a static field cell in the VM's field table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldId(pub u32);

/// Identifier of a function in the VM's function registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionId(pub u32);

/// Concrete class ids known to the compiler. The object model proper is an
/// external collaborator; this is the narrow accessor contract.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cid {
    Null,
    Bool,
    Smi,
    Double,
    /// Statically unknown receiver class.
    Dynamic,
}

/// An immutable object reference embedded in the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Obj {
    Null,
    Bool(bool),
    Smi(i64),
    Double(f64),
}

impl Obj {
    pub fn cid(&self) -> Cid {
        match self {
            Obj::Null => Cid::Null,
            Obj::Bool(_) => Cid::Bool,
            Obj::Smi(_) => Cid::Smi,
            Obj::Double(_) => Cid::Double,
        }
    }
}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Obj::Null => write!(f, "#null"),
            Obj::Bool(b) => write!(f, "#{b}"),
            Obj::Smi(v) => write!(f, "#{v}"),
            Obj::Double(v) => write!(f, "#{v}"),
        }
    }
}

/// An operand: a use of a value-producing instruction or an embedded constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Val {
    Use(InsnId),
    Constant(Obj),
}

impl Val {
    pub fn as_use(&self) -> Option<InsnId> {
        match self {
            Val::Use(id) => Some(*id),
            Val::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Obj> {
        match self {
            Val::Use(_) => None,
            Val::Constant(obj) => Some(obj),
        }
    }
}

/// Binary smi operations with a fast native path. Left shift, division and
/// modulo deliberately have no smi fast path and remain generic calls.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SmiOpKind {
    Add,
    Sub,
    Mul,
    BitAnd,
    BitOr,
    BitXor,
}

impl fmt::Display for SmiOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SmiOpKind::Add => "+",
            SmiOpKind::Sub => "-",
            SmiOpKind::Mul => "*",
            SmiOpKind::BitAnd => "&",
            SmiOpKind::BitOr => "|",
            SmiOpKind::BitXor => "^",
        };
        write!(f, "{s}")
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CmpKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Identity comparison, never deoptimizes.
    StrictEq,
    StrictNe,
}

impl fmt::Display for CmpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CmpKind::Eq => "==",
            CmpKind::Ne => "!=",
            CmpKind::Lt => "<",
            CmpKind::Le => "<=",
            CmpKind::Gt => ">",
            CmpKind::Ge => ">=",
            CmpKind::StrictEq => "===",
            CmpKind::StrictNe => "!==",
        };
        write!(f, "{s}")
    }
}

/// The closed instruction-kind enumeration. Dispatch is by pattern match;
/// the kind set is fixed, so no open extensibility is needed.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Incoming parameter; lives in the graph entry's start environment.
    Parameter { index: usize },
    /// Frame-slot read; exists only before SSA construction.
    LoadLocal { index: usize },
    /// Frame-slot write; exists only before SSA construction.
    StoreLocal { index: usize, value: Val },
    /// Join-point value selection; one input per predecessor, index-aligned.
    Phi { inputs: Vec<Val> },
    BinarySmiOp { op: SmiOpKind, left: Val, right: Val },
    Comparison { kind: CmpKind, left: Val, right: Val },
    /// Deoptimize unless the operand is a smi.
    CheckSmi { value: Val },
    /// Deoptimize unless the operand's class is one of `cids`.
    CheckClass { value: Val, cids: Vec<Cid> },
    LoadStaticField { field: FieldId },
    StoreStaticField { field: FieldId, value: Val },
    PushArgument { value: Val },
    /// Consumes `argc` preceding pushed arguments.
    StaticCall { target: FunctionId, argc: usize },
    Return { value: Val },
    Goto { target: BlockId },
    /// Branch with its comparison fused; the comparison produces the
    /// "location", the branch itself never does.
    Branch { kind: CmpKind, left: Val, right: Val, true_target: BlockId, false_target: BlockId },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Parameter { .. } => "Parameter",
            Op::LoadLocal { .. } => "LoadLocal",
            Op::StoreLocal { .. } => "StoreLocal",
            Op::Phi { .. } => "Phi",
            Op::BinarySmiOp { .. } => "BinarySmiOp",
            Op::Comparison { .. } => "Comparison",
            Op::CheckSmi { .. } => "CheckSmi",
            Op::CheckClass { .. } => "CheckClass",
            Op::LoadStaticField { .. } => "LoadStaticField",
            Op::StoreStaticField { .. } => "StoreStaticField",
            Op::PushArgument { .. } => "PushArgument",
            Op::StaticCall { .. } => "StaticCall",
            Op::Return { .. } => "Return",
            Op::Goto { .. } => "Goto",
            Op::Branch { .. } => "Branch",
        }
    }

    pub fn input_count(&self) -> usize {
        match self {
            Op::Parameter { .. }
            | Op::LoadLocal { .. }
            | Op::LoadStaticField { .. }
            | Op::StaticCall { .. }
            | Op::Goto { .. } => 0,
            Op::StoreLocal { .. }
            | Op::CheckSmi { .. }
            | Op::CheckClass { .. }
            | Op::StoreStaticField { .. }
            | Op::PushArgument { .. }
            | Op::Return { .. } => 1,
            Op::BinarySmiOp { .. } | Op::Comparison { .. } | Op::Branch { .. } => 2,
            Op::Phi { inputs } => inputs.len(),
        }
    }

    pub fn input_at(&self, i: usize) -> &Val {
        match (self, i) {
            (Op::StoreLocal { value, .. }, 0)
            | (Op::CheckSmi { value }, 0)
            | (Op::CheckClass { value, .. }, 0)
            | (Op::StoreStaticField { value, .. }, 0)
            | (Op::PushArgument { value }, 0)
            | (Op::Return { value }, 0) => value,
            (Op::BinarySmiOp { left, .. }, 0)
            | (Op::Comparison { left, .. }, 0)
            | (Op::Branch { left, .. }, 0) => left,
            (Op::BinarySmiOp { right, .. }, 1)
            | (Op::Comparison { right, .. }, 1)
            | (Op::Branch { right, .. }, 1) => right,
            (Op::Phi { inputs }, i) => &inputs[i],
            _ => panic!("{} has no input {i}", self.name()),
        }
    }

    pub fn set_input_at(&mut self, i: usize, val: Val) {
        match (self, i) {
            (Op::StoreLocal { value, .. }, 0)
            | (Op::CheckSmi { value }, 0)
            | (Op::CheckClass { value, .. }, 0)
            | (Op::StoreStaticField { value, .. }, 0)
            | (Op::PushArgument { value }, 0)
            | (Op::Return { value }, 0) => *value = val,
            (Op::BinarySmiOp { left, .. }, 0)
            | (Op::Comparison { left, .. }, 0)
            | (Op::Branch { left, .. }, 0) => *left = val,
            (Op::BinarySmiOp { right, .. }, 1)
            | (Op::Comparison { right, .. }, 1)
            | (Op::Branch { right, .. }, 1) => *right = val,
            (Op::Phi { inputs }, i) => inputs[i] = val,
            (op, i) => panic!("{} has no input {i}", op.name()),
        }
    }

    /// Control transfers terminate a block and are never linked as the
    /// `next` of another instruction.
    pub fn is_control(&self) -> bool {
        matches!(self, Op::Goto { .. } | Op::Branch { .. } | Op::Return { .. })
    }

    pub fn is_definition(&self) -> bool {
        !self.is_control()
    }

    /// Whether executing this instruction may transfer to unoptimized code.
    pub fn can_deoptimize(&self) -> bool {
        matches!(
            self,
            Op::BinarySmiOp { .. }
                | Op::CheckSmi { .. }
                | Op::CheckClass { .. }
                | Op::StaticCall { .. }
        )
    }

    /// Whether this instruction mutates state observable by other code.
    pub fn has_side_effect(&self) -> bool {
        matches!(
            self,
            Op::StoreStaticField { .. } | Op::StaticCall { .. } | Op::StoreLocal { .. }
        )
    }

    /// Whether this instruction's value may change when a side effect occurs.
    pub fn affected_by_side_effect(&self) -> bool {
        matches!(self, Op::LoadStaticField { .. } | Op::LoadLocal { .. })
    }

    pub fn record_assigned_vars(&self, assigned: &mut BitVector) {
        if let Op::StoreLocal { index, .. } = self {
            assigned.add(*index);
        }
    }
}

/// One arena slot: an instruction plus its graph bookkeeping.
#[derive(Clone, Debug)]
pub struct InsnData {
    pub op: Op,
    pub block: Option<BlockId>,
    pub prev: Option<InsnId>,
    pub next: Option<InsnId>,
    pub deopt_id: Option<DeoptId>,
    pub env: Option<Environment>,
    /// Assigned once during renaming, monotonically, never reused.
    pub ssa_index: Option<u32>,
    /// Use kind: true when the produced value is consumed, false for
    /// effect-only execution.
    pub is_used: bool,
    /// Optimizer cache; refined monotonically (only confirmed or widened).
    pub propagated_cid: Option<Cid>,
    /// Assigned by the register allocator.
    pub lifetime_position: i32,
    /// Phi liveness mark, set transitively after renaming.
    pub is_alive: bool,
}

impl InsnData {
    fn new(op: Op) -> Self {
        Self {
            op,
            block: None,
            prev: None,
            next: None,
            deopt_id: None,
            env: None,
            ssa_index: None,
            is_used: false,
            propagated_cid: None,
            lifetime_position: -1,
            is_alive: false,
        }
    }

    /// Monotone cid refinement: widen to Dynamic on disagreement, never
    /// narrow a Dynamic back down. Returns true if the cache changed.
    pub fn set_propagated_cid(&mut self, cid: Cid) -> bool {
        match self.propagated_cid {
            None => {
                self.propagated_cid = Some(cid);
                true
            }
            Some(Cid::Dynamic) => false,
            Some(old) if old == cid => false,
            Some(_) => {
                self.propagated_cid = Some(Cid::Dynamic);
                true
            }
        }
    }
}

/// A recorded operand slot referencing some definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UseRef {
    pub insn: InsnId,
    pub index: usize,
}

/// Per-definition use record, split into input uses and environment uses.
#[derive(Clone, Debug, Default)]
pub struct UseList {
    pub input_uses: Vec<UseRef>,
    pub env_uses: Vec<UseRef>,
}

/// The flow graph of one function body: instruction arena, block arena,
/// block orderings and SSA allocation counters.
pub struct FlowGraph {
    pub function: FunctionId,
    pub insns: Vec<InsnData>,
    pub blocks: Vec<BlockData>,
    pub graph_entry: BlockId,
    pub normal_entry: BlockId,
    pub catch_entries: Vec<BlockId>,
    /// Blocks in depth-first preorder; parallel with `parent` and
    /// `assigned_vars`.
    pub preorder: Vec<BlockId>,
    pub postorder: Vec<BlockId>,
    pub reverse_postorder: Vec<BlockId>,
    /// Depth-first spanning-tree parent, by preorder number.
    pub parent: Vec<usize>,
    /// Variables assigned per block, by preorder number.
    pub assigned_vars: Vec<BitVector>,
    pub variable_count: usize,
    pub parameter_count: usize,
    pub fixed_parameter_count: usize,
    pub current_ssa_temp_index: u32,
    /// Start environment installed on the graph entry during renaming.
    pub start_env: Option<Environment>,
    uses: Vec<UseList>,
}

impl FlowGraph {
    pub fn new(
        function: FunctionId,
        variable_count: usize,
        parameter_count: usize,
    ) -> Self {
        let mut graph = Self {
            function,
            insns: Vec::new(),
            blocks: Vec::new(),
            graph_entry: BlockId(0),
            normal_entry: BlockId(0),
            catch_entries: Vec::new(),
            preorder: Vec::new(),
            postorder: Vec::new(),
            reverse_postorder: Vec::new(),
            parent: Vec::new(),
            assigned_vars: Vec::new(),
            variable_count,
            parameter_count,
            fixed_parameter_count: parameter_count,
            current_ssa_temp_index: 0,
            start_env: None,
            uses: Vec::new(),
        };
        graph.graph_entry = graph.alloc_block(BlockKind::GraphEntry);
        graph.normal_entry = graph.alloc_block(BlockKind::TargetEntry);
        graph
    }

    pub fn alloc_block(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BlockData::new(kind));
        id
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BlockData {
        &mut self.blocks[id.index()]
    }

    pub fn insn(&self, id: InsnId) -> &InsnData {
        &self.insns[id.index()]
    }

    pub fn insn_mut(&mut self, id: InsnId) -> &mut InsnData {
        &mut self.insns[id.index()]
    }

    pub fn new_insn(&mut self, op: Op) -> InsnId {
        let id = InsnId(self.insns.len() as u32);
        self.insns.push(InsnData::new(op));
        self.uses.push(UseList::default());
        id
    }

    pub fn alloc_ssa_index(&mut self) -> u32 {
        let index = self.current_ssa_temp_index;
        self.current_ssa_temp_index += 1;
        index
    }

    /// Append an instruction at the end of a block's straight-line body.
    /// Control instructions become the block's terminator.
    pub fn append(&mut self, block: BlockId, insn: InsnId) {
        debug_assert!(self.insn(insn).block.is_none());
        let old_last = self.block(block).last;
        if let Some(last) = old_last {
            debug_assert!(
                !self.insn(last).op.is_control(),
                "appending after a control instruction"
            );
            self.insn_mut(last).next = Some(insn);
            self.insn_mut(insn).prev = Some(last);
        } else {
            self.block_mut(block).first = Some(insn);
        }
        self.block_mut(block).last = Some(insn);
        self.insn_mut(insn).block = Some(block);
    }

    /// Insert `insn` immediately before `before` in its block.
    pub fn insert_before(&mut self, before: InsnId, insn: InsnId) {
        let block = self.insn(before).block.expect("target not in a block");
        let prev = self.insn(before).prev;
        self.insn_mut(insn).block = Some(block);
        self.insn_mut(insn).prev = prev;
        self.insn_mut(insn).next = Some(before);
        self.insn_mut(before).prev = Some(insn);
        match prev {
            Some(p) => self.insn_mut(p).next = Some(insn),
            None => self.block_mut(block).first = Some(insn),
        }
    }

    /// Unlink an instruction from its block's body.
    pub fn remove_from_graph(&mut self, insn: InsnId) {
        let data = self.insn(insn);
        let (block, prev, next) = (data.block, data.prev, data.next);
        if let Some(block) = block {
            match prev {
                Some(p) => self.insn_mut(p).next = next,
                None => self.block_mut(block).first = next,
            }
            match next {
                Some(n) => self.insn_mut(n).prev = prev,
                None => self.block_mut(block).last = prev,
            }
        }
        let data = self.insn_mut(insn);
        data.block = None;
        data.prev = None;
        data.next = None;
    }

    /// The block's body instruction ids, in order. Collected up front so
    /// callers may edit the list while iterating.
    pub fn collect_block_insns(&self, block: BlockId) -> Vec<InsnId> {
        let mut out = Vec::new();
        let mut cursor = self.block(block).first;
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.insn(id).next;
        }
        out
    }

    /// Successor blocks of `block`, derived from its terminator (or from the
    /// entry lists for the graph entry).
    pub fn block_successors(&self, block: BlockId) -> Vec<BlockId> {
        if block == self.graph_entry {
            let mut succs = self.catch_entries.clone();
            succs.push(self.normal_entry);
            return succs;
        }
        match self.block(block).last.map(|id| &self.insn(id).op) {
            Some(Op::Goto { target }) => vec![*target],
            Some(Op::Branch { true_target, false_target, .. }) => {
                vec![*true_target, *false_target]
            }
            _ => Vec::new(),
        }
    }

    /// Whether `a` dominates `b` (reflexively).
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut current = b;
        loop {
            if current == a {
                return true;
            }
            match self.block(current).idom {
                Some(idom) => current = idom,
                None => return false,
            }
        }
    }

    pub fn cid_of_val(&self, val: &Val) -> Cid {
        match val {
            Val::Constant(obj) => obj.cid(),
            Val::Use(id) => self.insn(*id).propagated_cid.unwrap_or(Cid::Dynamic),
        }
    }

    // ---- Use lists -------------------------------------------------------

    pub fn use_list(&self, def: InsnId) -> &UseList {
        &self.uses[def.index()]
    }

    /// Rebuild the definition-to-uses multimap from the graph. Run at pass
    /// boundaries; incremental maintenance only happens inside
    /// `replace_all_uses`.
    pub fn compute_use_lists(&mut self) {
        self.uses = (0..self.insns.len()).map(|_| UseList::default()).collect();
        let all_blocks: Vec<BlockId> =
            (0..self.blocks.len() as u32).map(BlockId).collect();
        for block in all_blocks {
            if let Some(phis) = self.block(block).phis.clone() {
                for phi in phis.into_iter().flatten() {
                    self.record_insn_uses(phi);
                }
            }
            for insn in self.collect_block_insns(block) {
                self.record_insn_uses(insn);
            }
        }
    }

    /// Register the operand and environment uses of a newly created
    /// instruction with the multimap (`compute_use_lists` must have run).
    pub(crate) fn record_insn_uses(&mut self, insn: InsnId) {
        for i in 0..self.insn(insn).op.input_count() {
            if let Val::Use(def) = self.insn(insn).op.input_at(i) {
                let def = *def;
                self.uses[def.index()].input_uses.push(UseRef { insn, index: i });
            }
        }
        if let Some(env) = &self.insn(insn).env {
            let refs: Vec<(InsnId, usize)> = env
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_use().map(|d| (d, i)))
                .collect();
            for (def, index) in refs {
                self.uses[def.index()].env_uses.push(UseRef { insn, index });
            }
        }
    }

    /// Rewrite every operand slot and environment slot referencing `def` to
    /// `replacement`, keeping the use multimap in sync.
    pub fn replace_all_uses(&mut self, def: InsnId, replacement: Val) {
        debug_assert!(replacement.as_use() != Some(def));
        let list = std::mem::take(&mut self.uses[def.index()]);
        for use_ref in &list.input_uses {
            self.insn_mut(use_ref.insn).op.set_input_at(use_ref.index, replacement.clone());
        }
        for use_ref in &list.env_uses {
            let env = self.insn_mut(use_ref.insn).env.as_mut().expect("env use without env");
            env.values[use_ref.index] = replacement.clone();
        }
        if let Val::Use(new_def) = replacement {
            let target = &mut self.uses[new_def.index()];
            target.input_uses.extend_from_slice(&list.input_uses);
            target.env_uses.extend_from_slice(&list.env_uses);
        }
    }

    /// Check the bijection between recorded use lists and the operand slots
    /// actually present in the graph.
    pub fn validate_use_lists(&self) -> bool {
        if self.uses.len() != self.insns.len() {
            return false;
        }
        let mut actual: Vec<UseList> =
            (0..self.insns.len()).map(|_| UseList::default()).collect();
        for block_index in 0..self.blocks.len() {
            let block = BlockId(block_index as u32);
            let mut members: Vec<InsnId> = self.collect_block_insns(block);
            if let Some(phis) = &self.block(block).phis {
                members.extend(phis.iter().flatten().copied());
            }
            for insn in members {
                for i in 0..self.insn(insn).op.input_count() {
                    if let Val::Use(def) = self.insn(insn).op.input_at(i) {
                        actual[def.index()].input_uses.push(UseRef { insn, index: i });
                    }
                }
                if let Some(env) = &self.insn(insn).env {
                    for (i, v) in env.values.iter().enumerate() {
                        if let Some(def) = v.as_use() {
                            actual[def.index()].env_uses.push(UseRef { insn, index: i });
                        }
                    }
                }
            }
        }
        for (recorded, scanned) in self.uses.iter().zip(actual.iter()) {
            let mut a = recorded.input_uses.clone();
            let mut b = scanned.input_uses.clone();
            a.sort();
            b.sort();
            if a != b {
                return false;
            }
            let mut a = recorded.env_uses.clone();
            let mut b = scanned.env_uses.clone();
            a.sort();
            b.sort();
            if a != b {
                return false;
            }
        }
        true
    }
}

impl Ord for UseRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.insn, self.index).cmp(&(other.insn, other.index))
    }
}

impl PartialOrd for UseRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
