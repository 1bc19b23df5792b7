use std::collections::VecDeque;

use javelin_hir::{BinaryOp, Body, Expr, ExprId, LiteralKind, LocalId, Stmt, StmtId};
use javelin_types::{
    CompilerOptions, Diagnostic, DiagnosticCategory, Severity, Span,
};

use crate::cfg::{BlockId, CfgBuilder, ControlFlowGraph, Terminator};

/// Nullability of one local at one program point.
///
/// `Null`/`NonNull` are definite on every path; the `Potentially*` states
/// arise when paths with different definite states merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullState {
    Unknown,
    NonNull,
    Null,
    PotentiallyNull,
    PotentiallyNonNull,
}

impl NullState {
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        use NullState::*;
        if self == other {
            return self;
        }
        match (self, other) {
            (Null | PotentiallyNull, _) | (_, Null | PotentiallyNull) => PotentiallyNull,
            (NonNull | PotentiallyNonNull, _) | (_, NonNull | PotentiallyNonNull) => {
                PotentiallyNonNull
            }
            _ => Unknown,
        }
    }
}

/// Run every flow check the options ask for over one method body.
///
/// With none of `NullReference`, `RedundantNullCheck` and `UnreachableCode`
/// enabled this does no work at all, not even CFG construction.
#[must_use]
pub fn analyze(body: &Body, options: &CompilerOptions) -> Vec<Diagnostic> {
    let null_pass = options.is_enabled(DiagnosticCategory::NullReference)
        || options.is_enabled(DiagnosticCategory::RedundantNullCheck);
    let unreachable_pass = options.is_enabled(DiagnosticCategory::UnreachableCode);
    if !null_pass && !unreachable_pass {
        return Vec::new();
    }

    let _span = tracing::debug_span!("flow_analyze").entered();
    let cfg = build_cfg(body);
    let reachable = cfg.reachable_blocks();

    let mut diagnostics = Vec::new();
    if unreachable_pass {
        diagnostics.extend(unreachable_diagnostics(body, &cfg, &reachable, options));
    }
    if null_pass {
        diagnostics.extend(null_diagnostics(body, &cfg, &reachable, options));
    }
    diagnostics
}

fn unreachable_diagnostics(
    body: &Body,
    cfg: &ControlFlowGraph,
    reachable: &[bool],
    options: &CompilerOptions,
) -> Vec<Diagnostic> {
    let Some(severity) = options.severity(DiagnosticCategory::UnreachableCode) else {
        return Vec::new();
    };

    let mut diags = Vec::new();
    for (idx, bb) in cfg.blocks.iter().enumerate() {
        if reachable[idx] {
            continue;
        }

        // Synthetic join blocks carry neither statements nor an originating
        // statement; skip them.
        let stmt = bb
            .stmts
            .first()
            .copied()
            .or_else(|| bb.terminator.from_stmt());
        let Some(stmt) = stmt else { continue };

        diags.push(flow_diagnostic(
            severity,
            DiagnosticCategory::UnreachableCode,
            "Unreachable code".to_string(),
            stmt_span(body, stmt),
        ));
    }
    diags
}

fn stmt_span(body: &Body, stmt: StmtId) -> Span {
    match &body.stmts[stmt] {
        Stmt::Block { span, .. }
        | Stmt::Let { span, .. }
        | Stmt::Expr { span, .. }
        | Stmt::If { span, .. }
        | Stmt::While { span, .. }
        | Stmt::Do { span, .. }
        | Stmt::For { span, .. }
        | Stmt::Try { span, .. }
        | Stmt::Return { span, .. }
        | Stmt::Throw { span, .. }
        | Stmt::Break { span }
        | Stmt::Continue { span }
        | Stmt::Empty { span } => *span,
    }
}

fn flow_diagnostic(
    severity: Severity,
    category: DiagnosticCategory,
    message: String,
    span: Span,
) -> Diagnostic {
    match severity {
        Severity::Error => Diagnostic::error(category, message, span),
        Severity::Warning => Diagnostic::warning(category, message, span),
    }
}

// === CFG construction ===

#[derive(Debug, Clone, Copy)]
struct LoopContext {
    break_target: BlockId,
    continue_target: BlockId,
}

#[must_use]
pub fn build_cfg(body: &Body) -> ControlFlowGraph {
    let mut builder = HirCfgBuilder::new(body);
    let entry = builder.cfg.new_block();
    let _ = builder.build_stmt(body.root, entry);
    builder.cfg.build(entry)
}

struct HirCfgBuilder<'a> {
    body: &'a Body,
    cfg: CfgBuilder,
    loop_stack: Vec<LoopContext>,
}

impl<'a> HirCfgBuilder<'a> {
    fn new(body: &'a Body) -> Self {
        Self {
            body,
            cfg: CfgBuilder::new(),
            loop_stack: Vec::new(),
        }
    }

    fn build_seq(&mut self, stmts: &[StmtId], entry: BlockId) -> Option<BlockId> {
        let mut reachable_current: Option<BlockId> = Some(entry);
        let mut unreachable_current: Option<BlockId> = None;

        for &stmt in stmts {
            if let Some(cur) = reachable_current {
                reachable_current = self.build_stmt(stmt, cur);
                continue;
            }

            let cur = unreachable_current.unwrap_or_else(|| {
                let bb = self.cfg.new_block();
                unreachable_current = Some(bb);
                bb
            });

            unreachable_current = self.build_stmt(stmt, cur);
        }

        reachable_current
    }

    /// Build one statement starting in `entry`; returns the block execution
    /// falls through to, or `None` when the statement completes abruptly on
    /// every path.
    fn build_stmt(&mut self, stmt: StmtId, entry: BlockId) -> Option<BlockId> {
        match &self.body.stmts[stmt] {
            Stmt::Block { statements, .. } => self.build_seq(statements, entry),

            Stmt::Let { .. } | Stmt::Expr { .. } | Stmt::Empty { .. } => {
                self.cfg.push_stmt(entry, stmt);
                Some(entry)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let then_entry = self.cfg.new_block();
                let else_entry = self.cfg.new_block();
                let join = self.cfg.new_block();

                self.cfg.set_terminator(
                    entry,
                    Terminator::If {
                        condition: *condition,
                        then_target: then_entry,
                        else_target: else_entry,
                        from: stmt,
                    },
                );

                let then_fallthrough = self.build_stmt(*then_branch, then_entry);
                if let Some(bb) = then_fallthrough {
                    self.goto(bb, join);
                }

                let else_fallthrough = match else_branch {
                    Some(branch) => self.build_stmt(*branch, else_entry),
                    None => Some(else_entry),
                };
                if let Some(bb) = else_fallthrough {
                    self.goto(bb, join);
                }

                if then_fallthrough.is_some() || else_fallthrough.is_some() {
                    Some(join)
                } else {
                    None
                }
            }

            Stmt::While {
                condition, body, ..
            } => {
                let cond_bb = self.cfg.new_block();
                let body_bb = self.cfg.new_block();
                let after_bb = self.cfg.new_block();

                self.goto(entry, cond_bb);
                self.cfg.set_terminator(
                    cond_bb,
                    Terminator::If {
                        condition: *condition,
                        then_target: body_bb,
                        else_target: after_bb,
                        from: stmt,
                    },
                );

                self.loop_stack.push(LoopContext {
                    break_target: after_bb,
                    continue_target: cond_bb,
                });
                let body_fallthrough = self.build_stmt(*body, body_bb);
                self.loop_stack.pop();

                if let Some(bb) = body_fallthrough {
                    self.goto(bb, cond_bb);
                }

                Some(after_bb)
            }

            Stmt::Do {
                body, condition, ..
            } => {
                let body_bb = self.cfg.new_block();
                let cond_bb = self.cfg.new_block();
                let after_bb = self.cfg.new_block();

                self.goto(entry, body_bb);

                self.loop_stack.push(LoopContext {
                    break_target: after_bb,
                    continue_target: cond_bb,
                });
                let body_fallthrough = self.build_stmt(*body, body_bb);
                self.loop_stack.pop();

                if let Some(bb) = body_fallthrough {
                    self.goto(bb, cond_bb);
                }

                self.cfg.set_terminator(
                    cond_bb,
                    Terminator::If {
                        condition: *condition,
                        then_target: body_bb,
                        else_target: after_bb,
                        from: stmt,
                    },
                );

                Some(after_bb)
            }

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                let init_fallthrough = self.build_seq(init, entry);
                let Some(init_end) = init_fallthrough else {
                    return None;
                };

                let cond_bb = self.cfg.new_block();
                let body_bb = self.cfg.new_block();
                let update_bb = if update.is_empty() {
                    cond_bb
                } else {
                    self.cfg.new_block()
                };
                let after_bb = self.cfg.new_block();

                self.goto(init_end, cond_bb);

                match condition {
                    Some(cond) => self.cfg.set_terminator(
                        cond_bb,
                        Terminator::If {
                            condition: *cond,
                            then_target: body_bb,
                            else_target: after_bb,
                            from: stmt,
                        },
                    ),
                    None => {
                        // No condition: the loop only exits via break.
                        self.cfg.set_terminator(
                            cond_bb,
                            Terminator::Goto {
                                target: body_bb,
                                from: Some(stmt),
                            },
                        );
                    }
                }

                self.loop_stack.push(LoopContext {
                    break_target: after_bb,
                    continue_target: update_bb,
                });
                let body_fallthrough = self.build_stmt(*body, body_bb);
                self.loop_stack.pop();

                if let Some(bb) = body_fallthrough {
                    self.goto(bb, update_bb);
                }

                if !update.is_empty() {
                    if let Some(bb) = self.build_seq(update, update_bb) {
                        self.goto(bb, cond_bb);
                    }
                }

                Some(after_bb)
            }

            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                let body_entry = self.cfg.new_block();
                let catch_entries: Vec<BlockId> =
                    catches.iter().map(|_| self.cfg.new_block()).collect();
                let finally_entry = finally.as_ref().map(|_| self.cfg.new_block());

                // The exception edge leaves from before the first protected
                // statement, so catch clauses and the finally block see the
                // state entering the try joined with whatever the protected
                // block produced.
                let mut targets = vec![body_entry];
                targets.extend(catch_entries.iter().copied());
                if let Some(fe) = finally_entry {
                    targets.push(fe);
                }
                self.cfg
                    .set_terminator(entry, Terminator::Multi { targets, from: stmt });

                let mut ends = Vec::new();
                if let Some(bb) = self.build_stmt(*body, body_entry) {
                    ends.push(bb);
                }
                for (catch, catch_entry) in catches.iter().zip(catch_entries) {
                    self.cfg.mark_catch_param(catch_entry, catch.local);
                    if let Some(bb) = self.build_stmt(catch.body, catch_entry) {
                        ends.push(bb);
                    }
                }

                match (finally, finally_entry) {
                    (Some(finally), Some(finally_entry)) => {
                        for bb in ends {
                            self.goto(bb, finally_entry);
                        }
                        self.build_stmt(*finally, finally_entry)
                    }
                    _ => {
                        if ends.is_empty() {
                            None
                        } else {
                            let join = self.cfg.new_block();
                            for bb in ends {
                                self.goto(bb, join);
                            }
                            Some(join)
                        }
                    }
                }
            }

            Stmt::Return { expr, .. } => {
                self.cfg.set_terminator(
                    entry,
                    Terminator::Return {
                        value: *expr,
                        from: stmt,
                    },
                );
                None
            }

            Stmt::Throw { expr, .. } => {
                self.cfg.set_terminator(
                    entry,
                    Terminator::Throw {
                        exception: *expr,
                        from: stmt,
                    },
                );
                None
            }

            Stmt::Break { .. } => {
                let target = self
                    .loop_stack
                    .last()
                    .map(|ctx| ctx.break_target)
                    .unwrap_or(entry);
                self.cfg.set_terminator(
                    entry,
                    Terminator::Goto {
                        target,
                        from: Some(stmt),
                    },
                );
                None
            }

            Stmt::Continue { .. } => {
                let target = self
                    .loop_stack
                    .last()
                    .map(|ctx| ctx.continue_target)
                    .unwrap_or(entry);
                self.cfg.set_terminator(
                    entry,
                    Terminator::Goto {
                        target,
                        from: Some(stmt),
                    },
                );
                None
            }
        }
    }

    fn goto(&mut self, from: BlockId, to: BlockId) {
        self.cfg.set_terminator(
            from,
            Terminator::Goto {
                target: to,
                from: None,
            },
        );
    }
}

// === Null analysis ===

fn null_diagnostics(
    body: &Body,
    cfg: &ControlFlowGraph,
    reachable: &[bool],
    options: &CompilerOptions,
) -> Vec<Diagnostic> {
    let mut pass = NullPass {
        body,
        deref_severity: options.severity(DiagnosticCategory::NullReference),
        redundant_severity: options.severity(DiagnosticCategory::RedundantNullCheck),
        emitting: false,
        diags: Vec::new(),
    };

    let in_states = pass.fixpoint(cfg, reachable);

    // Replay reachable blocks over the converged states, this time emitting.
    pass.emitting = true;
    for (idx, bb) in cfg.blocks.iter().enumerate() {
        if !reachable[idx] {
            continue;
        }
        let mut state = in_states[idx].clone();
        for stmt in &bb.stmts {
            pass.transfer_stmt(*stmt, &mut state);
        }
        pass.transfer_terminator(&bb.terminator, &mut state);
    }

    pass.diags
}

struct NullPass<'a> {
    body: &'a Body,
    deref_severity: Option<Severity>,
    redundant_severity: Option<Severity>,
    emitting: bool,
    diags: Vec<Diagnostic>,
}

impl NullPass<'_> {
    fn fixpoint(&mut self, cfg: &ControlFlowGraph, reachable: &[bool]) -> Vec<Vec<NullState>> {
        let n_blocks = cfg.blocks.len();
        let n_locals = self.body.locals.len();

        let mut in_states = vec![vec![NullState::Unknown; n_locals]; n_blocks];
        let mut out_states = vec![vec![NullState::Unknown; n_locals]; n_blocks];

        let mut worklist = VecDeque::new();
        for idx in 0..n_blocks {
            if reachable[idx] {
                worklist.push_back(BlockId(idx));
            }
        }

        while let Some(bb) = worklist.pop_front() {
            if !reachable[bb.index()] {
                continue;
            }

            let mut new_in = if bb == cfg.entry {
                vec![NullState::Unknown; n_locals]
            } else {
                join_states(
                    n_locals,
                    cfg.predecessors(bb).iter().filter_map(|pred| {
                        if reachable[pred.index()] {
                            Some(edge_narrow_null(
                                self.body,
                                cfg,
                                *pred,
                                bb,
                                &out_states[pred.index()],
                            ))
                        } else {
                            None
                        }
                    }),
                )
            };

            // The exception parameter is bound on entry to its clause.
            for &(catch_bb, local) in &cfg.catch_params {
                if catch_bb == bb && local.idx() < new_in.len() {
                    new_in[local.idx()] = NullState::NonNull;
                }
            }

            if new_in != in_states[bb.index()] {
                in_states[bb.index()] = new_in.clone();
            }

            let mut new_out = new_in;
            let block = cfg.block(bb);
            for stmt in &block.stmts {
                self.transfer_stmt(*stmt, &mut new_out);
            }
            self.transfer_terminator(&block.terminator, &mut new_out);

            if new_out != out_states[bb.index()] {
                out_states[bb.index()] = new_out;
                for succ in cfg.successors(bb) {
                    worklist.push_back(succ);
                }
            }
        }

        in_states
    }

    fn transfer_stmt(&mut self, stmt: StmtId, state: &mut Vec<NullState>) {
        match &self.body.stmts[stmt] {
            Stmt::Let {
                local, initializer, ..
            } => {
                let value = initializer
                    .map(|expr| self.eval(expr, state))
                    .unwrap_or(NullState::Unknown);
                if local.idx() < state.len() {
                    state[local.idx()] = value;
                }
            }
            Stmt::Expr { expr, .. } => {
                let _ = self.eval(*expr, state);
            }
            Stmt::Empty { .. } => {}
            Stmt::Block { .. } => unreachable!("block statements are flattened in CFG"),
            Stmt::If { .. }
            | Stmt::While { .. }
            | Stmt::Do { .. }
            | Stmt::For { .. }
            | Stmt::Try { .. }
            | Stmt::Return { .. }
            | Stmt::Throw { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. } => {
                unreachable!("control-flow statements live in terminators")
            }
        }
    }

    fn transfer_terminator(&mut self, term: &Terminator, state: &mut Vec<NullState>) {
        match *term {
            Terminator::If { condition, .. } => {
                let _ = self.eval(condition, state);
            }
            Terminator::Return {
                value: Some(value), ..
            } => {
                let _ = self.eval(value, state);
            }
            Terminator::Throw { exception, .. } => {
                let _ = self.eval(exception, state);
            }
            Terminator::Return { value: None, .. }
            | Terminator::Goto { .. }
            | Terminator::Multi { .. }
            | Terminator::Exit => {}
        }
    }

    /// Evaluate one expression: compute its null state, apply assignment
    /// effects, and (while emitting) report dereference and redundant-check
    /// problems.
    fn eval(&mut self, expr: ExprId, state: &mut Vec<NullState>) -> NullState {
        match &self.body.exprs[expr] {
            Expr::Name { name, .. } => self
                .body
                .local_by_name(name)
                .and_then(|local| state.get(local.idx()).copied())
                .unwrap_or(NullState::Unknown),

            Expr::Literal { kind, .. } => match kind {
                LiteralKind::Null => NullState::Null,
                _ => NullState::NonNull,
            },

            Expr::This { .. } => NullState::NonNull,

            Expr::New { args, .. } => {
                for arg in args.clone() {
                    let _ = self.eval(arg, state);
                }
                NullState::NonNull
            }

            Expr::FieldAccess { receiver, .. } => {
                self.deref(*receiver, state);
                NullState::Unknown
            }

            Expr::Call { receiver, args, .. } => {
                let receiver = *receiver;
                for arg in args.clone() {
                    let _ = self.eval(arg, state);
                }
                if let Some(receiver) = receiver {
                    self.deref(receiver, state);
                }
                NullState::Unknown
            }

            Expr::ArrayIndex { array, index, .. } => {
                let (array, index) = (*array, *index);
                let _ = self.eval(index, state);
                self.deref(array, state);
                NullState::Unknown
            }

            Expr::Unary { operand, .. } => {
                let _ = self.eval(*operand, state);
                NullState::NonNull
            }

            Expr::Binary { op, lhs, rhs, .. } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
                    self.check_redundant_comparison(lhs, rhs, state);
                }
                let _ = self.eval(lhs, state);
                let _ = self.eval(rhs, state);
                NullState::NonNull
            }

            Expr::Assign { target, value, .. } => {
                let (target, value) = (*target, *value);
                let value_state = self.eval(value, state);
                match &self.body.exprs[target] {
                    Expr::Name { name, .. } => {
                        if let Some(local) = self.body.local_by_name(name) {
                            if local.idx() < state.len() {
                                state[local.idx()] = value_state;
                            }
                        }
                    }
                    _ => {
                        // Field or array element store: the receiver is still
                        // dereferenced.
                        let _ = self.eval(target, state);
                    }
                }
                value_state
            }

            Expr::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => {
                let (condition, then_value, else_value) = (*condition, *then_value, *else_value);
                let _ = self.eval(condition, state);
                let then_state = self.eval(then_value, state);
                let else_state = self.eval(else_value, state);
                then_state.join(else_state)
            }

            Expr::InstanceOf { operand, .. } => {
                let _ = self.eval(*operand, state);
                NullState::NonNull
            }

            Expr::Missing { .. } => NullState::Unknown,
        }
    }

    /// A receiver position: evaluate, report if the variable is known null,
    /// and record that a completed dereference proves it non-null.
    fn deref(&mut self, receiver: ExprId, state: &mut Vec<NullState>) {
        let receiver_state = self.eval(receiver, state);
        let Expr::Name { name, span } = &self.body.exprs[receiver] else {
            return;
        };
        let Some(local) = self.body.local_by_name(name) else {
            return;
        };

        if let Some(severity) = self.deref_severity {
            match receiver_state {
                NullState::Null => self.report(
                    severity,
                    DiagnosticCategory::NullReference,
                    format!("The variable {name} can only be null at this location"),
                    *span,
                ),
                NullState::PotentiallyNull => self.report(
                    Severity::Warning,
                    DiagnosticCategory::NullReference,
                    format!("The variable {name} may be null at this location"),
                    *span,
                ),
                _ => {}
            }
        }

        if local.idx() < state.len() {
            state[local.idx()] = NullState::NonNull;
        }
    }

    fn check_redundant_comparison(
        &mut self,
        lhs: ExprId,
        rhs: ExprId,
        state: &[NullState],
    ) {
        let Some(severity) = self.redundant_severity else {
            return;
        };
        let compared = if is_null_literal(self.body, rhs) {
            lhs
        } else if is_null_literal(self.body, lhs) {
            rhs
        } else {
            return;
        };
        let Expr::Name { name, span } = &self.body.exprs[compared] else {
            return;
        };
        let Some(local) = self.body.local_by_name(name) else {
            return;
        };

        if state.get(local.idx()) == Some(&NullState::NonNull) {
            self.report(
                severity,
                DiagnosticCategory::RedundantNullCheck,
                format!("The variable {name} cannot be null at this location"),
                *span,
            );
        }
    }

    fn report(
        &mut self,
        severity: Severity,
        category: DiagnosticCategory,
        message: String,
        span: Span,
    ) {
        if self.emitting {
            self.diags.push(flow_diagnostic(severity, category, message, span));
        }
    }
}

fn join_states(
    n_locals: usize,
    mut inputs: impl Iterator<Item = Vec<NullState>>,
) -> Vec<NullState> {
    let Some(first) = inputs.next() else {
        return vec![NullState::Unknown; n_locals];
    };
    let mut out = first;
    for inp in inputs {
        for (slot, v) in out.iter_mut().zip(inp.into_iter()) {
            *slot = slot.join(v);
        }
    }
    out
}

/// Refine the state flowing along one CFG edge using the predecessor's
/// branch condition. Only `x == null` / `x != null` shapes narrow.
fn edge_narrow_null(
    body: &Body,
    cfg: &ControlFlowGraph,
    pred: BlockId,
    succ: BlockId,
    out_state: &[NullState],
) -> Vec<NullState> {
    let mut state = out_state.to_vec();

    let Terminator::If {
        condition,
        then_target,
        else_target,
        ..
    } = cfg.block(pred).terminator
    else {
        return state;
    };

    let branch = if succ == then_target {
        true
    } else if succ == else_target {
        false
    } else {
        return state;
    };

    let Some((local, on_true, on_false)) = null_test(body, condition) else {
        return state;
    };

    let value = if branch { on_true } else { on_false };
    if local.idx() < state.len() {
        state[local.idx()] = value;
    }

    state
}

fn null_test(body: &Body, expr: ExprId) -> Option<(LocalId, NullState, NullState)> {
    let Expr::Binary { op, lhs, rhs, .. } = &body.exprs[expr] else {
        return None;
    };
    let is_eq = match op {
        BinaryOp::Eq => true,
        BinaryOp::Ne => false,
        _ => return None,
    };

    let compared = if is_null_literal(body, *rhs) {
        *lhs
    } else if is_null_literal(body, *lhs) {
        *rhs
    } else {
        return None;
    };
    let Expr::Name { name, .. } = &body.exprs[compared] else {
        return None;
    };
    let local = body.local_by_name(name)?;

    if is_eq {
        Some((local, NullState::Null, NullState::NonNull))
    } else {
        Some((local, NullState::NonNull, NullState::Null))
    }
}

fn is_null_literal(body: &Body, expr: ExprId) -> bool {
    matches!(
        body.exprs[expr],
        Expr::Literal {
            kind: LiteralKind::Null,
            ..
        }
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_hir::lower_method;
    use javelin_syntax::ast::Member;
    use javelin_syntax::{parse, ParserConfig};
    use javelin_types::{CheckSeverity, CompilerOptions, DiagnosticCategory, Severity};

    use super::*;

    fn body_of(source: &str) -> Body {
        let outcome = parse(source, &ParserConfig::default()).expect("parse aborted");
        assert_eq!(outcome.diagnostics, vec![]);
        let Member::Method(method) = &outcome.unit.types[0].members[0] else {
            panic!("expected a method");
        };
        lower_method(method)
    }

    fn all_checks() -> CompilerOptions {
        CompilerOptions::new()
            .with(DiagnosticCategory::NullReference, CheckSeverity::Error)
            .with(DiagnosticCategory::RedundantNullCheck, CheckSeverity::Warning)
            .with(DiagnosticCategory::UnreachableCode, CheckSeverity::Warning)
    }

    fn messages(source: &str) -> Vec<String> {
        analyze(&body_of(source), &all_checks())
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn disabled_options_do_no_work() {
        let body = body_of("class A { void m() { String s = null; s.length(); } }");
        assert_eq!(analyze(&body, &CompilerOptions::new()), vec![]);
    }

    #[test]
    fn definite_null_dereference_is_an_error() {
        let body = body_of("class A { void m() { String s = null; s.length(); } }");
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "The variable s can only be null at this location"
        );
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].category, DiagnosticCategory::NullReference);
    }

    #[test]
    fn assignment_clears_the_null_state() {
        let msgs =
            messages("class A { void m() { String s = null; s = \"x\"; s.length(); } }");
        assert_eq!(msgs, Vec::<String>::new());
    }

    #[test]
    fn null_check_narrows_the_guarded_branch() {
        let msgs =
            messages("class A { void m(String s) { if (s != null) { s.length(); } } }");
        assert_eq!(msgs, Vec::<String>::new());
    }

    #[test]
    fn merged_branches_report_may_be_null() {
        let body = body_of(
            "class A { void m(boolean b) { String s = null; if (b) { s = \"x\"; } s.length(); } }",
        );
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "The variable s may be null at this location"
        );
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn redundant_null_check_on_non_null_value() {
        let body =
            body_of("class A { void m() { String s = \"x\"; if (s == null) { } } }");
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "The variable s cannot be null at this location"
        );
        assert_eq!(diags[0].category, DiagnosticCategory::RedundantNullCheck);
    }

    #[test]
    fn unreachable_code_after_return() {
        let body = body_of("class A { void m() { return; f(); } }");
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unreachable code");
        assert_eq!(diags[0].category, DiagnosticCategory::UnreachableCode);
    }

    #[test]
    fn catch_parameter_is_non_null() {
        let msgs = messages(
            "class A { void m() { try { f(); } catch (Exception e) { e.toString(); } } }",
        );
        assert_eq!(msgs, Vec::<String>::new());
    }

    #[test]
    fn finally_joins_with_the_state_entering_the_try() {
        let body = body_of(
            "class A { void m() { String s = \"x\"; try { s = null; f(); } finally { s.length(); } } }",
        );
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "The variable s may be null at this location"
        );
    }

    #[test]
    fn for_loop_builds_a_cycle() {
        let msgs = messages(
            "class A { void m(int n) { for (int i = 0; i < n; i = i + 1) { f(); } } }",
        );
        assert_eq!(msgs, Vec::<String>::new());
    }

    #[test]
    fn dereference_proves_the_variable_non_null() {
        // The second call on the same maybe-null variable is not re-reported.
        let body = body_of(
            "class A { void m(boolean b) { String s = null; if (b) { s = \"x\"; } s.length(); s.length(); } }",
        );
        let diags = analyze(&body, &all_checks());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn join_is_commutative() {
        use NullState::*;
        let states = [Unknown, NonNull, Null, PotentiallyNull, PotentiallyNonNull];
        for a in states {
            for b in states {
                assert_eq!(a.join(b), b.join(a), "{a:?} join {b:?}");
            }
        }
        assert_eq!(Null.join(NonNull), PotentiallyNull);
        assert_eq!(NonNull.join(Unknown), PotentiallyNonNull);
        assert_eq!(Null.join(Null), Null);
    }
}
