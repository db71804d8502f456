//! x86-64 general-purpose register identifiers and the calling-convention
//! register sets used by the allocator and the code generator.

use std::fmt;

/// A general-purpose register in x86-64 encoding order (rax = 0 .. r15 = 15).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Reg(pub u8);

pub const RAX: Reg = Reg(0);
pub const RCX: Reg = Reg(1);
pub const RDX: Reg = Reg(2);
pub const RBX: Reg = Reg(3);
pub const RSP: Reg = Reg(4);
pub const RBP: Reg = Reg(5);
pub const RSI: Reg = Reg(6);
pub const RDI: Reg = Reg(7);
pub const R8: Reg = Reg(8);
pub const R9: Reg = Reg(9);
pub const R10: Reg = Reg(10);
pub const R11: Reg = Reg(11);

/// SysV integer argument registers, in order.
pub const ARG_REGS: [Reg; 6] = [RDI, RSI, RDX, RCX, R8, R9];

/// Registers the allocator may hand out. Caller-saved only, so calls need no
/// save/restore beyond the allocator's own live-across-call spilling; rsp and
/// rbp frame registers and the two scratch registers are excluded.
pub const ALLOCATABLE: [Reg; 7] = [RAX, RCX, RDX, RSI, RDI, R8, R9];

/// Scratch register for emit-time materialization of operands.
pub const SCRATCH: Reg = R10;

/// Second scratch register, reserved for parallel-move cycle breaking.
pub const SCRATCH2: Reg = R11;

impl Reg {
    pub fn name(self) -> &'static str {
        const NAMES: [&str; 16] = [
            "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11",
            "r12", "r13", "r14", "r15",
        ];
        NAMES[self.0 as usize]
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
