//! Constraint generation from function bodies and global initializers.
//!
//! Runs once per unit after every unit's variables have been added, so calls
//! to functions declared in other units find their variables.

use crate::error::ResolveError;
use crate::state::ProgramInfo;
use ptrsafe_ast::{
    BinaryOp, DeclId, DeclKind, Expr, ExprId, Stmt, TranslationUnit, Type, structurally_equal,
};
use ptrsafe_common::limits::MAX_EXPR_RESOLVE_DEPTH;
use ptrsafe_solver::{CVarSet, Category};
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub functions: usize,
    pub statements: usize,
    /// Statements abandoned because an expression could not be resolved.
    pub skipped: usize,
}

pub struct ConstraintBuilder<'a> {
    info: &'a mut ProgramInfo,
    unit: &'a TranslationUnit,
    /// Inside a function body, parameters resolve through the definition.
    in_body: bool,
    stats: BuildStats,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(info: &'a mut ProgramInfo, unit: &'a TranslationUnit) -> Self {
        ConstraintBuilder {
            info,
            unit,
            in_body: false,
            stats: BuildStats::default(),
        }
    }

    /// Walk every global initializer and function body of the unit.
    pub fn build(mut self) -> BuildStats {
        let unit = self.unit;
        for &id in &unit.top_level {
            match &unit.decl(id).kind {
                DeclKind::Var {
                    init: Some(init), ..
                } => {
                    self.in_body = false;
                    let result = self.visit_initializer(id, *init);
                    self.finish_statement(id, result);
                }
                DeclKind::Function { body: Some(_), .. } => self.visit_function(id),
                _ => {}
            }
        }
        debug!(file = %unit.file, stats = ?self.stats, "built constraints");
        self.stats
    }

    fn visit_function(&mut self, func: DeclId) {
        let unit = self.unit;
        let Some(body) = unit.decl(func).body() else {
            return;
        };
        self.in_body = true;
        self.stats.functions += 1;
        for stmt in Stmt::leaves(body) {
            let result = match stmt {
                Stmt::Expr { expr } => self.visit_expr(*expr, 0),
                Stmt::Return { value: Some(value) } => self.visit_return(func, *value),
                Stmt::Return { value: None } => Ok(()),
                Stmt::Decl { decl } => match &unit.decl(*decl).kind {
                    DeclKind::Var {
                        init: Some(init), ..
                    } => self.visit_initializer(*decl, *init),
                    _ => Ok(()),
                },
                Stmt::Block { .. } => Ok(()),
            };
            self.finish_statement(func, result);
        }
        self.in_body = false;
    }

    fn finish_statement(&mut self, owner: DeclId, result: Result<(), ResolveError>) {
        self.stats.statements += 1;
        if let Err(err) = result {
            self.stats.skipped += 1;
            warn!(
                in_decl = %self.unit.decl(owner).name,
                error = %err,
                "skipping statement"
            );
        }
    }

    fn resolve(&mut self, expr: ExprId) -> Result<CVarSet, ResolveError> {
        self.info.resolve_expr(self.unit, expr, self.in_body)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn visit_initializer(&mut self, var: DeclId, init: ExprId) -> Result<(), ResolveError> {
        let lhs = self.info.lookup(self.unit, var, self.in_body)?;
        self.assign(&lhs, Some(var), init)?;
        self.visit_expr(init, 0)
    }

    fn visit_return(&mut self, func: DeclId, value: ExprId) -> Result<(), ResolveError> {
        let returns: CVarSet = self
            .info
            .variables_at(&self.unit.anchor(func))
            .into_iter()
            .flatten()
            .filter_map(|&v| self.info.arena().function(v))
            .flat_map(|f| f.returns.iter().copied())
            .collect();
        self.assign(&returns, None, value)?;
        self.visit_expr(value, 0)
    }

    /// Equate the target of an assignment with its value.
    ///
    /// A value cast from an incompatible type is forced wild. Results of
    /// allow-listed externs (`malloc`) are not equated, so unrelated
    /// allocations do not share atoms; a sized allocation instead records its
    /// target as an array candidate.
    fn assign(
        &mut self,
        lhs: &CVarSet,
        target: Option<DeclId>,
        value: ExprId,
    ) -> Result<(), ResolveError> {
        let unit = self.unit;
        if let Some(target) = target {
            self.record_allocation(target, value);
        }
        let core = unit.ignore_paren_imp_casts(value);
        if let Expr::Cast { ty, inner } = unit.expr(core) {
            if self.is_allowed_extern_call(*inner) {
                return Ok(());
            }
            let operand = self.resolve(*inner)?;
            if let Some(from) = self.declared_type(*inner) {
                if !structurally_equal(ty, &from) {
                    debug!(from = %from, to = %ty, "incompatible cast; forcing wild");
                    self.info.constrain_set_to(&operand, Category::least_safe());
                }
            }
            self.info.constrain_eq_sets(lhs, &operand);
            return Ok(());
        }
        if self.is_allowed_extern_call(core) {
            return Ok(());
        }
        let rhs = self.resolve(value)?;
        self.info.constrain_eq_sets(lhs, &rhs);
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expr(&mut self, expr: ExprId, depth: u32) -> Result<(), ResolveError> {
        if depth > MAX_EXPR_RESOLVE_DEPTH {
            return Err(ResolveError::DepthExceeded { expr });
        }
        let unit = self.unit;
        let next = depth + 1;
        match unit.expr(expr) {
            Expr::Subscript { base, index } => {
                if !is_zero(unit, *index) {
                    self.require_array(*base)?;
                }
                self.visit_expr(*base, next)?;
                self.visit_expr(*index, next)
            }
            Expr::Binary {
                op: BinaryOp::Assign,
                lhs,
                rhs,
            } => {
                let targets = self.resolve(*lhs)?;
                let target = match unit.expr(unit.ignore_paren_imp_casts(*lhs)) {
                    Expr::DeclRef { decl } => Some(*decl),
                    _ => None,
                };
                self.assign(&targets, target, *rhs)?;
                self.visit_expr(*lhs, next)?;
                self.visit_expr(*rhs, next)
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.visit_expr(*lhs, next)?;
                self.visit_expr(*rhs, next)
            }
            Expr::Call { callee, args } => {
                self.visit_call(expr, *callee, args)?;
                self.visit_expr(*callee, next)?;
                for &arg in args {
                    self.visit_expr(arg, next)?;
                }
                Ok(())
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.visit_expr(*cond, next)?;
                self.visit_expr(*then, next)?;
                self.visit_expr(*otherwise, next)
            }
            Expr::StringLiteral { .. } => self.resolve(expr).map(drop),
            Expr::Member { base: inner, .. }
            | Expr::Unary { operand: inner, .. }
            | Expr::Paren { inner }
            | Expr::ImplicitCast { inner }
            | Expr::BindTemporary { inner }
            | Expr::Cast { inner, .. } => self.visit_expr(*inner, next),
            Expr::DeclRef { .. } | Expr::IntLiteral { .. } | Expr::SizeOf { .. } => Ok(()),
        }
    }

    /// `base[i]` with `i` other than `0`: the outermost level of `base` must
    /// carry bounds.
    fn require_array(&mut self, base: ExprId) -> Result<(), ResolveError> {
        for v in self.resolve(base)? {
            let outer = self
                .info
                .arena()
                .pointer(v)
                .and_then(|p| p.atoms.first().copied());
            if let Some(atom) = outer {
                self.info.constraints_mut().eq_const(atom, Category::Arr);
            }
        }
        Ok(())
    }

    /// Equate each argument with the callee's parameter slot, seen from the
    /// declaration. Arguments past the declared parameters are forced wild.
    fn visit_call(
        &mut self,
        call: ExprId,
        callee: ExprId,
        args: &[ExprId],
    ) -> Result<(), ResolveError> {
        let unit = self.unit;
        if self.is_allowed_extern_call(call) {
            return Ok(());
        }
        let candidates = match unit.callee_decl(call) {
            Some(target) if !unit.decl(target).is_declarator() => {
                return Err(ResolveError::UnclassifiableCallee {
                    anchor: unit.anchor(target),
                });
            }
            Some(target) => self.info.lookup(unit, target, false)?,
            None => self.resolve(callee)?,
        };
        let Some(params) = candidates
            .iter()
            .filter_map(|&v| self.info.arena().reachable_function(v))
            .filter_map(|f| self.info.arena().function(f))
            .map(|f| f.params.clone())
            .last()
        else {
            return Ok(());
        };
        for (i, &arg) in args.iter().enumerate() {
            let values = self.resolve(arg)?;
            match params.get(i) {
                Some(slot) => self.info.constrain_eq_sets(slot, &values),
                None => {
                    self.info.constrain_set_to(&values, Category::least_safe());
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Allocation evidence
    // =========================================================================

    /// `p = malloc(n * sizeof(T))` or `p = calloc(n, sizeof(T))` makes `p` an
    /// array candidate sized by `n`.
    fn record_allocation(&mut self, target: DeclId, value: ExprId) {
        let unit = self.unit;
        let call = strip_casts(unit, value);
        let Expr::Call { args, .. } = unit.expr(call) else {
            return;
        };
        let Some(callee) = unit.callee_decl(call) else {
            return;
        };
        let size = match (unit.decl(callee).name.as_str(), args.as_slice()) {
            ("malloc", [bytes]) => match unit.expr(strip_casts(unit, *bytes)) {
                Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs,
                    rhs,
                } => {
                    if is_size_of(unit, *lhs) {
                        Some(*rhs)
                    } else {
                        Some(*lhs)
                    }
                }
                _ => None,
            },
            ("calloc", [count, _]) => Some(*count),
            _ => None,
        };
        if let Some(size) = size {
            self.info.insert_potential_array_var(unit, target);
            self.info.add_allocation_based_size_expr(unit, target, size);
        }
    }

    fn is_allowed_extern_call(&self, expr: ExprId) -> bool {
        let unit = self.unit;
        let call = strip_casts(unit, expr);
        if !matches!(unit.expr(call), Expr::Call { .. }) {
            return false;
        }
        unit.callee_decl(call).is_some_and(|callee| {
            let decl = unit.decl(callee);
            decl.is_function() && self.info.options().is_extern_allowed(&decl.name)
        })
    }

    /// Static type of a name or member reference.
    fn declared_type(&self, expr: ExprId) -> Option<Type> {
        let unit = self.unit;
        match unit.expr(unit.ignore_paren_imp_casts(expr)) {
            Expr::DeclRef { decl } => unit.decl(*decl).ty(),
            Expr::Member { field, .. } => unit.decl(*field).ty(),
            _ => None,
        }
    }
}

fn strip_casts(unit: &TranslationUnit, mut expr: ExprId) -> ExprId {
    loop {
        expr = unit.ignore_paren_imp_casts(expr);
        match unit.expr(expr) {
            Expr::Cast { inner, .. } => expr = *inner,
            _ => return expr,
        }
    }
}

fn is_zero(unit: &TranslationUnit, expr: ExprId) -> bool {
    matches!(
        unit.expr(strip_casts(unit, expr)),
        Expr::IntLiteral { value: 0 }
    )
}

fn is_size_of(unit: &TranslationUnit, expr: ExprId) -> bool {
    matches!(unit.expr(strip_casts(unit, expr)), Expr::SizeOf { .. })
}
