//! Populating the Index while a unit is open.

use crate::cvar::{Atoms, ConstraintVariable, FunctionVariable, PointerVariable};
use crate::state::ProgramInfo;
use ptrsafe_ast::{DeclId, DeclKind, FunctionType, TranslationUnit, Type};
use ptrsafe_common::{CVarId, FuncKey};
use ptrsafe_solver::{CVarSet, Category};
use tracing::{debug, trace, warn};

/// Registry key of one declaration: `file:line:name`.
pub fn decl_key(unit: &TranslationUnit, decl: DeclId) -> FuncKey {
    let d = unit.decl(decl);
    FuncKey::new(&d.loc.file, d.loc.line, &d.name)
}

/// Registry key of a function: the key of its definition when the unit has
/// one, otherwise of the given declaration.
pub fn func_key(unit: &TranslationUnit, func: DeclId) -> FuncKey {
    decl_key(unit, unit.definition_of(func).unwrap_or(func))
}

impl ProgramInfo {
    // =========================================================================
    // Variable construction
    // =========================================================================

    /// A pointer variable with one fresh atom per pointer/array level of
    /// `ty`. A function-typed pointee gets its own signature attached.
    pub(crate) fn new_pointer_variable(
        &mut self,
        ty: &Type,
        name: &str,
        itype: Option<&str>,
    ) -> CVarId {
        let atoms: Atoms = (0..ty.pointer_depth())
            .map(|_| self.cs.fresh_var())
            .collect();
        let base = ty.base();
        let function = base
            .as_function()
            .map(|fty| self.new_function_variable_from_type(fty, name));
        self.vars.alloc(ConstraintVariable::Pointer(PointerVariable {
            atoms,
            base_type: base.to_string(),
            name: name.to_string(),
            function,
            is_array: ty.is_array(),
            itype: itype.map(str::to_string),
        }))
    }

    /// A signature built from a type alone, as for the pointee of a function
    /// pointer. Parameter variables are not indexed anywhere.
    pub(crate) fn new_function_variable_from_type(
        &mut self,
        fty: &FunctionType,
        name: &str,
    ) -> CVarId {
        let ret = self.new_pointer_variable(&fty.ret, name, None);
        let params = fty
            .params
            .iter()
            .map(|p| CVarSet::from([self.new_pointer_variable(p, "", None)]))
            .collect();
        self.vars.alloc(ConstraintVariable::Function(FunctionVariable {
            name: name.to_string(),
            returns: CVarSet::from([ret]),
            params,
            has_body: false,
            has_prototype: fty.has_prototype,
            signature: Some(fty.clone()),
        }))
    }

    /// A signature for a function declaration, with one variable per
    /// parameter declaration.
    pub(crate) fn new_function_variable(&mut self, unit: &TranslationUnit, func: DeclId) -> CVarId {
        let decl = unit.decl(func);
        let DeclKind::Function { ty: fty, .. } = &decl.kind else {
            panic!("'{}' is not a function declaration", decl.name);
        };
        let ret = self.new_pointer_variable(&fty.ret, &decl.name, None);
        let mut params = Vec::with_capacity(decl.function_params().len());
        for &p in decl.function_params() {
            let param = unit.decl(p);
            let ty = param.ty().unwrap_or_else(Type::int);
            let pv = self.new_pointer_variable(&ty, &param.name, param.itype());
            // Parameters never pass through `add_variable`.
            if !unit.is_rewritable(p) {
                debug!(name = %param.name, "parameter inside macro; forcing wild");
                self.constrain_to(pv, Category::least_safe());
            }
            params.push(CVarSet::from([pv]));
        }
        self.vars.alloc(ConstraintVariable::Function(FunctionVariable {
            name: decl.name.clone(),
            returns: CVarSet::from([ret]),
            params,
            has_body: decl.has_body(),
            has_prototype: fty.has_prototype,
            signature: Some(fty.clone()),
        }))
    }

    // =========================================================================
    // Index population
    // =========================================================================

    /// Create and index the constraint variables of a declarator.
    ///
    /// Pointer- and array-typed declarators get a pointer variable,
    /// function-typed ones a function variable; an anchor keeps the first
    /// variable of each kind. Returns whether anything was created.
    pub fn add_variable(&mut self, unit: &TranslationUnit, decl: DeclId) -> bool {
        self.assert_open(unit);
        let d = unit.decl(decl);
        if !d.is_declarator() {
            trace!(name = %d.name, "not a declarator; nothing to add");
            return false;
        }
        let Some(ty) = d.ty() else {
            return false;
        };
        let anchor = unit.anchor(decl);
        debug_assert!(anchor.is_valid(), "declaration '{}' has no location", d.name);

        let (has_pointer, has_function) = self
            .variables
            .get(&anchor)
            .map(|set| {
                (
                    set.iter().any(|&v| self.vars.pointer(v).is_some()),
                    set.iter().any(|&v| self.vars.function(v).is_some()),
                )
            })
            .unwrap_or((false, false));

        let mut created = false;
        if ty.is_function() && !has_function {
            let fv = self.new_function_variable(unit, decl);
            self.variables.entry(anchor.clone()).or_default().insert(fv);
            self.register_function(unit, decl, fv);
            created = true;
        }
        if (ty.is_pointer() || ty.is_array()) && !has_pointer {
            let pv = self.new_pointer_variable(&ty, &d.name, d.itype());
            self.variables.entry(anchor.clone()).or_default().insert(pv);
            created = true;
        }

        if created {
            trace!(name = %d.name, %anchor, "added variable");
        }
        if !unit.is_rewritable(decl) {
            if let Some(set) = self.variables.get(&anchor).cloned() {
                debug!(name = %d.name, %anchor, "declaration inside macro; forcing wild");
                self.constrain_set_to(&set, Category::least_safe());
            }
        }
        created
    }

    /// Record a new function variable in the key registries and index its
    /// parameters at their own anchors.
    fn register_function(&mut self, unit: &TranslationUnit, func: DeclId, fv: CVarId) {
        let decl = unit.decl(func);
        let key = decl_key(unit, func);
        if decl.has_body() {
            self.cs.registry_mut().add_definition(key.clone(), fv);
            if let Some(declaration) = unit.declaration_of(func) {
                self.cs
                    .registry_mut()
                    .link_definition(key, decl_key(unit, declaration));
            }
        } else {
            self.cs.registry_mut().add_declaration(key, fv);
        }

        let slots = self
            .vars
            .function(fv)
            .map(|f| f.params.clone())
            .unwrap_or_default();
        for (&param, slot) in decl.function_params().iter().zip(slots) {
            self.variables
                .entry(unit.anchor(param))
                .or_default()
                .extend(slot);
        }
    }

    /// Note a function declaration for linking.
    ///
    /// Global functions update the Extern Table (a body, once seen, stays
    /// seen) and contribute their function variables to the Global Symbol
    /// Table. Call after [`add_variable`](Self::add_variable).
    pub fn see_function_decl(&mut self, unit: &TranslationUnit, func: DeclId) {
        self.assert_open(unit);
        let decl = unit.decl(func);
        if !decl.is_global_function() {
            return;
        }
        let seen = self.extern_functions.entry(decl.name.clone()).or_insert(false);
        *seen |= decl.has_body();

        let anchor = unit.anchor(func);
        let functions: Vec<CVarId> = self
            .variables
            .get(&anchor)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&v| self.vars.function(v).is_some())
            .collect();
        if functions.is_empty() {
            warn!(name = %decl.name, %anchor, "function seen before its variables were added");
            return;
        }
        self.global_symbols
            .entry(decl.name.clone())
            .or_default()
            .extend(functions);
    }
}
