// src/codegen/patterns.rs
// THIS FILE IS MANDATORY - DEFINES PATTERN RECOGNITION ENGINE

#[derive(Debug, Clone)]
pub enum Pattern {
    Binary { op: BinaryOp, lhs: Operand, rhs: Operand },
    Unary { op: UnaryOp, operand: Operand },
    Memory { op: MemoryOp, base: Operand, index: Option<Operand>, scale: u8, offset: i32 },
    Select { cond: Operand, true_val: Operand, false_val: Operand },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Shl,
    Lshr,
    Ashr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
    Abs,
    Sqrt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryOp {
    Load,
    Store,
    LoadModifyStore,
}

#[derive(Debug, Clone)]
pub enum Operand {
    Reg,
    RegOrImm,
    Imm,
    Mem,
}

// MANDATORY: Study Target.cpp lines 397-457 for pattern matching logic
// YOU MUST implement handle_rm, handle_rmi, handle_ri patterns
pub const fn matches_pattern(inst: &Instruction, pattern: &Pattern) -> bool {
    match (inst, pattern) {
        (Instruction::Add { .. }, Pattern::Binary { op: BinaryOp::Add, .. }) => true,
        (Instruction::Sub { .. }, Pattern::Binary { op: BinaryOp::Sub, .. }) => true,
        (Instruction::Mul { .. }, Pattern::Binary { op: BinaryOp::Mul, .. }) => true,
        (Instruction::Div { .. }, Pattern::Binary { op: BinaryOp::Div, .. }) => true,
        // YOU MUST add ALL patterns from Target.cpp
        _ => false,
    }
}

// Placeholder for Instruction type
#[derive(Debug)]
pub enum Instruction {
    Add { dst: u32, src1: u32, src2: u32 },
    Sub { dst: u32, src1: u32, src2: u32 },
    Mul { dst: u32, src1: u32, src2: u32 },
    Div { dst: u32, src1: u32, src2: u32 },
    Load { dst: u32, addr: u32 },
    Store { addr: u32, value: u32 },
}

// MANDATORY: Pattern conditions from Target.cpp
pub struct PatternCondition {
    pub operand_idx: usize,
    pub condition_type: &'static str, // "encodeable_as_imm32_sext", "encodeable_with"
    pub condition_arg: String,
}

// MANDATORY: Port MICandidate from Target.cpp line 23
pub struct InstructionCandidate {
    pub conditions: Vec<PatternCondition>,
    // Note: We'll need to handle lifetimes properly in the final implementation
    // For now, this is a placeholder structure
}