//! Context-aware declaration lookup.

use crate::error::LookupError;
use crate::state::ProgramInfo;
use ptrsafe_ast::{DeclId, TranslationUnit};
use ptrsafe_solver::CVarSet;

impl ProgramInfo {
    /// The variables a declaration denotes.
    ///
    /// `in_function_context` asks for the view from inside the owning
    /// function's body: a parameter then resolves through the function's
    /// definition instead of its declaration. A function's own name is always
    /// resolved in declaration context. Declarations that were never indexed
    /// (e.g. only declared in a header that was not analyzed) resolve to the
    /// empty set.
    pub fn lookup(
        &mut self,
        unit: &TranslationUnit,
        decl: DeclId,
        in_function_context: bool,
    ) -> Result<CVarSet, LookupError> {
        self.assert_open(unit);
        let d = unit.decl(decl);
        let anchor = unit.anchor(decl);
        if !self.variables.contains_key(&anchor) {
            return Ok(CVarSet::new());
        }

        if d.is_function() {
            return Ok(match unit.declaration_of(decl) {
                Some(declaration) => self.stored_at(unit, declaration),
                None => self.on_demand_declaration(unit, decl),
            });
        }

        if d.is_param() {
            let (owner, index) = unit
                .param_index(decl)
                .ok_or(LookupError::OrphanParameter { anchor })?;
            if in_function_context {
                let definition =
                    unit.definition_of(owner)
                        .ok_or_else(|| LookupError::MissingDefinition {
                            function: unit.decl(owner).name.clone(),
                        })?;
                return Ok(self.param_slot(unit, definition, index));
            }
            return Ok(match unit.declaration_of(owner) {
                Some(declaration) => self.param_slot(unit, declaration, index),
                None => {
                    let mut slot = CVarSet::new();
                    for fv in self.on_demand_declaration(unit, owner) {
                        if let Some(params) = self
                            .vars
                            .function(fv)
                            .and_then(|f| f.params.get(index))
                        {
                            slot.extend(params);
                        }
                    }
                    slot
                }
            });
        }

        Ok(self.stored_at(unit, decl))
    }

    fn stored_at(&self, unit: &TranslationUnit, decl: DeclId) -> CVarSet {
        self.variables
            .get(&unit.anchor(decl))
            .cloned()
            .unwrap_or_default()
    }

    /// Variables at the anchor of `func`'s `index`-th parameter declaration.
    /// K&R declarations list no parameters and yield the empty set.
    fn param_slot(&self, unit: &TranslationUnit, func: DeclId, index: usize) -> CVarSet {
        unit.decl(func)
            .function_params()
            .get(index)
            .map(|&p| self.stored_at(unit, p))
            .unwrap_or_default()
    }
}
