//! Translation units and the navigation queries the inference core relies on.

use crate::node::{Decl, DeclId, DeclKind, Expr, ExprId, Stmt};
use ptrsafe_common::{Anchor, UnitId};
use serde::{Deserialize, Serialize};

/// One parsed and resolved translation unit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TranslationUnit {
    #[serde(default)]
    pub id: UnitId,
    /// Main file of the unit.
    pub file: String,
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub exprs: Vec<Expr>,
    /// Declarations at file scope, in source order.
    #[serde(default)]
    pub top_level: Vec<DeclId>,
}

impl TranslationUnit {
    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    /// Get a declaration by id.
    ///
    /// Ids are only ever minted by the unit that owns them, so an out-of-range
    /// id is a caller bug and panics.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    /// Get an expression by id. Panics on ids from another unit.
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Stable anchor of a declaration.
    pub fn anchor(&self, id: DeclId) -> Anchor {
        self.decl(id).loc.clone()
    }

    /// Whether the declaration's text can be rewritten (it is not the product
    /// of a macro expansion).
    pub fn is_rewritable(&self, id: DeclId) -> bool {
        !self.decl(id).in_macro
    }

    /// Every declaration in the unit, with its id.
    pub fn iter_decls(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d))
    }

    /// All function declarations of `name` in this unit, in source order.
    pub fn function_redecls<'a>(&'a self, name: &'a str) -> impl Iterator<Item = DeclId> + 'a {
        self.iter_decls()
            .filter(move |(_, d)| d.is_function() && d.name == name)
            .map(|(id, _)| id)
    }

    /// The first redeclaration of `func` that is not a definition.
    pub fn declaration_of(&self, func: DeclId) -> Option<DeclId> {
        let name = &self.decl(func).name;
        self.function_redecls(name)
            .find(|&id| !self.decl(id).has_body())
    }

    /// The redeclaration of `func` that carries a body.
    pub fn definition_of(&self, func: DeclId) -> Option<DeclId> {
        let name = &self.decl(func).name;
        self.function_redecls(name).find(|&id| self.decl(id).has_body())
    }

    /// Owning function and 0-based position of a parameter.
    ///
    /// Returns `None` when the parameter has no recorded owner or the owner
    /// does not list it.
    pub fn param_index(&self, param: DeclId) -> Option<(DeclId, usize)> {
        let DeclKind::Param {
            owner: Some(owner), ..
        } = &self.decl(param).kind
        else {
            return None;
        };
        let owner = *owner;
        let position = self
            .get(owner)?
            .function_params()
            .iter()
            .position(|&p| p == param)?;
        Some((owner, position))
    }

    /// Strip parentheses and implicit conversions.
    pub fn ignore_paren_imp_casts(&self, mut expr: ExprId) -> ExprId {
        loop {
            match self.expr(expr) {
                Expr::Paren { inner } | Expr::ImplicitCast { inner } => expr = *inner,
                _ => return expr,
            }
        }
    }

    /// The declaration a call's callee names directly, if any.
    ///
    /// `f(..)`, `(f)(..)` and `s.fp(..)` name a declaration; calls through a
    /// subscript or another call do not.
    pub fn callee_decl(&self, call: ExprId) -> Option<DeclId> {
        let Expr::Call { callee, .. } = self.expr(call) else {
            return None;
        };
        match self.expr(self.ignore_paren_imp_casts(*callee)) {
            Expr::DeclRef { decl } => Some(*decl),
            Expr::Member { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// File-scope declarations followed by each body's local declarations, in
    /// source order. Parameters are reached through their functions.
    pub fn declarators(&self) -> Vec<DeclId> {
        let mut out = Vec::with_capacity(self.decls.len());
        for &id in &self.top_level {
            out.push(id);
            for stmt in Stmt::leaves(self.decl(id).body().unwrap_or_default()) {
                if let Stmt::Decl { decl } = stmt {
                    out.push(*decl);
                }
            }
        }
        out
    }
}
