//! Flow analysis: CFG construction, reachability, and null tracking over
//! lowered method bodies.

mod cfg;
mod flow;

pub use crate::cfg::{BasicBlock, BlockId, ControlFlowGraph, Successors, Terminator};
pub use crate::flow::{analyze, build_cfg, NullState};
