//! Deoptimization environments: the abstract interpreter state (locals plus
//! pending call arguments) captured at a program point. Deopt info tables
//! are serialized from these snapshots after register allocation.

use crate::il::Val;

#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    /// Locals in slot order, then the expression-stack suffix.
    pub values: Vec<Val>,
    pub fixed_parameter_count: usize,
}

impl Environment {
    pub fn new(values: Vec<Val>, fixed_parameter_count: usize) -> Self {
        Self { values, fixed_parameter_count }
    }

    /// Environments are copied, never shared, so that renaming of one
    /// instruction's snapshot cannot leak into a sibling's.
    pub fn deep_copy(&self) -> Environment {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
