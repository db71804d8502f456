//! Flow-graph printing for the trace flags and the ilview tool.

use crate::il::{BlockId, BlockKind, FlowGraph, InsnId, Op, Val};
use std::fmt;

pub struct FlowGraphPrinter<'a> {
    graph: &'a FlowGraph,
    display_environments: bool,
}

impl<'a> FlowGraphPrinter<'a> {
    pub fn new(graph: &'a FlowGraph) -> Self {
        Self { graph, display_environments: false }
    }

    pub fn with_environments(graph: &'a FlowGraph) -> Self {
        Self { graph, display_environments: true }
    }

    fn fmt_val(&self, f: &mut fmt::Formatter, val: &Val) -> fmt::Result {
        match val {
            Val::Constant(obj) => write!(f, "{obj}"),
            Val::Use(id) => self.fmt_def_name(f, *id),
        }
    }

    fn fmt_def_name(&self, f: &mut fmt::Formatter, id: InsnId) -> fmt::Result {
        match self.graph.insn(id).ssa_index {
            Some(ssa) => write!(f, "v{ssa}"),
            None => write!(f, "{id}"),
        }
    }

    fn fmt_insn(&self, f: &mut fmt::Formatter, id: InsnId) -> fmt::Result {
        let data = self.graph.insn(id);
        write!(f, "    ")?;
        if data.is_used {
            self.fmt_def_name(f, id)?;
            write!(f, " <- ")?;
        }
        match &data.op {
            Op::Parameter { index } => write!(f, "Parameter({index})")?,
            Op::LoadLocal { index } => write!(f, "LoadLocal({index})")?,
            Op::StoreLocal { index, value } => {
                write!(f, "StoreLocal({index}, ")?;
                self.fmt_val(f, value)?;
                write!(f, ")")?;
            }
            Op::Phi { inputs } => {
                write!(f, "phi(")?;
                let mut prefix = "";
                for input in inputs {
                    write!(f, "{prefix}")?;
                    self.fmt_val(f, input)?;
                    prefix = ", ";
                }
                write!(f, ")")?;
            }
            Op::BinarySmiOp { op, left, right } => {
                write!(f, "BinarySmiOp:{op}(")?;
                self.fmt_val(f, left)?;
                write!(f, ", ")?;
                self.fmt_val(f, right)?;
                write!(f, ")")?;
            }
            Op::Comparison { kind, left, right } => {
                write!(f, "Comparison:{kind}(")?;
                self.fmt_val(f, left)?;
                write!(f, ", ")?;
                self.fmt_val(f, right)?;
                write!(f, ")")?;
            }
            Op::CheckSmi { value } => {
                write!(f, "CheckSmi(")?;
                self.fmt_val(f, value)?;
                write!(f, ")")?;
            }
            Op::CheckClass { value, cids } => {
                write!(f, "CheckClass(")?;
                self.fmt_val(f, value)?;
                write!(f, ", {cids:?})")?;
            }
            Op::LoadStaticField { field } => write!(f, "LoadStaticField(f{})", field.0)?,
            Op::StoreStaticField { field, value } => {
                write!(f, "StoreStaticField(f{}, ", field.0)?;
                self.fmt_val(f, value)?;
                write!(f, ")")?;
            }
            Op::PushArgument { value } => {
                write!(f, "PushArgument(")?;
                self.fmt_val(f, value)?;
                write!(f, ")")?;
            }
            Op::StaticCall { target, argc } => {
                write!(f, "StaticCall(fn{}, argc={argc})", target.0)?;
            }
            Op::Return { value } => {
                write!(f, "Return(")?;
                self.fmt_val(f, value)?;
                write!(f, ")")?;
            }
            Op::Goto { target } => {
                write!(f, "goto B{}", self.graph.block(*target).block_id)?;
            }
            Op::Branch { kind, left, right, true_target, false_target } => {
                write!(f, "if ")?;
                self.fmt_val(f, left)?;
                write!(f, " {kind} ")?;
                self.fmt_val(f, right)?;
                write!(
                    f,
                    " goto (B{}, B{})",
                    self.graph.block(*true_target).block_id,
                    self.graph.block(*false_target).block_id
                )?;
            }
        }
        if self.display_environments {
            if let Some(env) = &data.env {
                write!(f, " env={{")?;
                let mut prefix = "";
                for value in &env.values {
                    write!(f, "{prefix}")?;
                    self.fmt_val(f, value)?;
                    prefix = ", ";
                }
                write!(f, "}}")?;
            }
        }
        writeln!(f)
    }

    fn fmt_block(&self, f: &mut fmt::Formatter, id: BlockId) -> fmt::Result {
        let block = self.graph.block(id);
        let kind = match block.kind {
            BlockKind::GraphEntry => "graph",
            BlockKind::TargetEntry => "target",
            BlockKind::JoinEntry => "join",
            BlockKind::CatchEntry => "catch",
        };
        write!(f, "  B{}[{kind}]", block.block_id)?;
        if !block.preds.is_empty() {
            write!(f, " pred(")?;
            let mut prefix = "";
            for pred in &block.preds {
                write!(f, "{prefix}B{}", self.graph.block(*pred).block_id)?;
                prefix = ", ";
            }
            write!(f, ")")?;
        }
        writeln!(f)?;
        if let Some(phis) = &block.phis {
            for phi in phis.iter().flatten() {
                self.fmt_insn(f, *phi)?;
            }
        }
        for insn in self.graph.collect_block_insns(id) {
            self.fmt_insn(f, insn)?;
        }
        Ok(())
    }
}

impl fmt::Display for FlowGraphPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "fn{} {{", self.graph.function.0)?;
        if self.graph.reverse_postorder.is_empty() {
            for index in 0..self.graph.blocks.len() {
                self.fmt_block(f, BlockId(index as u32))?;
            }
        } else {
            for &block in &self.graph.reverse_postorder {
                if block == self.graph.graph_entry {
                    continue;
                }
                self.fmt_block(f, block)?;
            }
        }
        writeln!(f, "}}")
    }
}
