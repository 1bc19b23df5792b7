//! Lowered method bodies for analysis.
//!
//! Arena-allocated statement/expression soup with id newtypes. The lowering
//! erases syntax-only shape (parentheses, combined binary compaction, folded
//! string chains) so flow analysis works on one canonical form.

mod hir;
mod lowering;

pub use hir::{
    Arena, BinaryOp, Body, Catch, Expr, ExprId, LiteralKind, Local, LocalId, Stmt, StmtId,
};
pub use lowering::{lower_block, lower_method};

#[cfg(test)]
mod tests;
