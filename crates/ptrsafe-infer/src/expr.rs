//! Mapping expressions to the constraint variables they denote.

use crate::cvar::{Atoms, ConstraintVariable, FunctionVariable, PointerVariable};
use crate::error::ResolveError;
use crate::state::ProgramInfo;
use ptrsafe_ast::{Expr, ExprId, TranslationUnit, UnaryOp};
use ptrsafe_common::CVarId;
use ptrsafe_common::limits::MAX_EXPR_RESOLVE_DEPTH;
use ptrsafe_solver::{CVarSet, Category};
use tracing::trace;

impl ProgramInfo {
    /// Resolve `expr` to its constraint variables.
    ///
    /// Results are stable: derived variables, string literals and call
    /// placeholders are memoized, so resolving the same expression again
    /// yields the same set.
    pub fn resolve_expr(
        &mut self,
        unit: &TranslationUnit,
        expr: ExprId,
        in_function_context: bool,
    ) -> Result<CVarSet, ResolveError> {
        self.assert_open(unit);
        self.resolve_at_depth(unit, expr, in_function_context, 0)
    }

    fn resolve_at_depth(
        &mut self,
        unit: &TranslationUnit,
        expr: ExprId,
        ifc: bool,
        depth: u32,
    ) -> Result<CVarSet, ResolveError> {
        if depth > MAX_EXPR_RESOLVE_DEPTH {
            return Err(ResolveError::DepthExceeded { expr });
        }
        let next = depth + 1;
        match unit.expr(expr) {
            Expr::Paren { inner }
            | Expr::ImplicitCast { inner }
            | Expr::BindTemporary { inner } => self.resolve_at_depth(unit, *inner, ifc, next),
            Expr::DeclRef { decl } => Ok(self.lookup(unit, *decl, ifc)?),
            Expr::Member { field, .. } => Ok(self.lookup(unit, *field, ifc)?),
            Expr::Binary { lhs, rhs, .. } => {
                let mut set = self.resolve_at_depth(unit, *lhs, ifc, next)?;
                set.extend(self.resolve_at_depth(unit, *rhs, ifc, next)?);
                Ok(set)
            }
            Expr::Subscript { base, .. } => {
                let base = self.resolve_at_depth(unit, *base, ifc, next)?;
                Ok(self.strip_level(&base))
            }
            Expr::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let base = self.resolve_at_depth(unit, *operand, ifc, next)?;
                if base.iter().any(|&v| self.vars.function(v).is_some()) {
                    return Err(ResolveError::DerefOfFunction { expr });
                }
                Ok(self.strip_level(&base))
            }
            Expr::Unary { operand, .. } => self.resolve_at_depth(unit, *operand, ifc, next),
            Expr::Call { callee, .. } => self.resolve_call(unit, expr, *callee, next),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let mut set = self.resolve_at_depth(unit, *cond, ifc, next)?;
                set.extend(self.resolve_at_depth(unit, *then, ifc, next)?);
                set.extend(self.resolve_at_depth(unit, *otherwise, ifc, next)?);
                Ok(set)
            }
            Expr::StringLiteral { value } => {
                Ok(CVarSet::from([self.string_literal(unit, expr, value)]))
            }
            Expr::IntLiteral { .. } | Expr::Cast { .. } | Expr::SizeOf { .. } => {
                Ok(CVarSet::new())
            }
        }
    }

    /// Calls resolve in declaration context whatever the caller asked for.
    fn resolve_call(
        &mut self,
        unit: &TranslationUnit,
        call: ExprId,
        callee: ExprId,
        depth: u32,
    ) -> Result<CVarSet, ResolveError> {
        let Some(target) = unit.callee_decl(call) else {
            let mut returns = CVarSet::new();
            for v in self.resolve_at_depth(unit, callee, false, depth)? {
                let function = self.vars.reachable_function(v);
                if let Some(f) = function.and_then(|f| self.vars.function(f)) {
                    returns.extend(f.returns.iter().copied());
                }
            }
            return Ok(returns);
        };
        if !unit.decl(target).is_declarator() {
            return Err(ResolveError::UnclassifiableCallee {
                anchor: unit.anchor(target),
            });
        }
        let found = self
            .lookup(unit, target, false)?
            .into_iter()
            .filter_map(|v| self.vars.reachable_function(v))
            .last();
        if let Some(returns) = found
            .and_then(|f| self.vars.function(f))
            .map(|f| f.returns.clone())
        {
            return Ok(returns);
        }
        Ok(CVarSet::from([self.call_placeholder(unit, call)]))
    }

    /// The variables one dereference below each pointer variable in `set`.
    /// Pointers with a single level contribute nothing.
    pub(crate) fn strip_level(&mut self, set: &CVarSet) -> CVarSet {
        let mut out = CVarSet::new();
        for &v in set {
            if let Some(derived) = self.derived_of(v) {
                out.insert(derived);
            }
        }
        out
    }

    fn derived_of(&mut self, var: CVarId) -> Option<CVarId> {
        if let Some(&memo) = self.derived.get(&var) {
            return memo;
        }
        let stripped = self.vars.pointer(var).and_then(PointerVariable::stripped);
        let derived = stripped.map(|p| self.vars.alloc(ConstraintVariable::Pointer(p)));
        self.derived.insert(var, derived);
        derived
    }

    fn string_literal(&mut self, unit: &TranslationUnit, expr: ExprId, value: &str) -> CVarId {
        if let Some(&v) = self.open_unit(unit).literals.get(&expr) {
            return v;
        }
        let atom = self.cs.fresh_var();
        self.cs.eq_const(atom, Category::NtArr);
        let v = self.vars.alloc(ConstraintVariable::Pointer(PointerVariable {
            atoms: Atoms::from_slice(&[atom]),
            base_type: "const char".to_string(),
            name: value.to_string(),
            function: None,
            is_array: false,
            itype: None,
        }));
        trace!(expr = expr.0, "string literal");
        self.open_unit_mut(unit).literals.insert(expr, v);
        v
    }

    fn call_placeholder(&mut self, unit: &TranslationUnit, call: ExprId) -> CVarId {
        if let Some(&v) = self.open_unit(unit).placeholders.get(&call) {
            return v;
        }
        let v = self
            .vars
            .alloc(ConstraintVariable::Function(FunctionVariable::placeholder()));
        trace!(call = call.0, "call target unknown; placeholder signature");
        self.open_unit_mut(unit).placeholders.insert(call, v);
        v
    }
}
