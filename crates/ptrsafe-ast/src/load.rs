//! Loading translation units written by the front end.

use crate::node::{DeclId, DeclKind, Expr, ExprId, Stmt};
use crate::unit::TranslationUnit;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    DanglingDecl { file: String, decl: u32 },
    DanglingExpr { file: String, expr: u32 },
    /// An operand that does not precede the expression using it, which is how
    /// a cycle shows up in the arena.
    CyclicExpr { file: String, expr: u32 },
    /// An expression used as the operand of more than one expression.
    SharedExpr { file: String, expr: u32 },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read '{}': {}", path.display(), source)
            }
            LoadError::Parse { path, source } => {
                write!(f, "malformed unit '{}': {}", path.display(), source)
            }
            LoadError::DanglingDecl { file, decl } => {
                write!(f, "unit '{file}' refers to missing declaration #{decl}")
            }
            LoadError::DanglingExpr { file, expr } => {
                write!(f, "unit '{file}' refers to missing expression #{expr}")
            }
            LoadError::CyclicExpr { file, expr } => {
                write!(
                    f,
                    "expression #{expr} of unit '{file}' has an operand that does not precede it"
                )
            }
            LoadError::SharedExpr { file, expr } => {
                write!(
                    f,
                    "expression #{expr} of unit '{file}' is the operand of more than one expression"
                )
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Read and validate one unit from a JSON file.
pub fn load_unit(path: &Path) -> Result<TranslationUnit, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let unit: TranslationUnit =
        serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    unit.validate()?;
    debug!(
        file = %unit.file,
        decls = unit.decls.len(),
        exprs = unit.exprs.len(),
        "loaded translation unit"
    );
    Ok(unit)
}

impl TranslationUnit {
    /// Check that every id stored in the unit points into its arenas, so the
    /// indexing accessors cannot panic on front-end output.
    ///
    /// Expressions must also form a forest: every operand precedes the
    /// expression that uses it and belongs to exactly one such expression.
    /// That keeps every walk over an expression finite and linear.
    pub fn validate(&self) -> Result<(), LoadError> {
        let decl_ok = |id: DeclId| -> Result<(), LoadError> {
            if id.index() < self.decls.len() {
                Ok(())
            } else {
                Err(LoadError::DanglingDecl {
                    file: self.file.clone(),
                    decl: id.0,
                })
            }
        };
        let expr_ok = |id: ExprId| -> Result<(), LoadError> {
            if id.index() < self.exprs.len() {
                Ok(())
            } else {
                Err(LoadError::DanglingExpr {
                    file: self.file.clone(),
                    expr: id.0,
                })
            }
        };

        for &id in &self.top_level {
            decl_ok(id)?;
        }
        for decl in &self.decls {
            match &decl.kind {
                DeclKind::Var { init: Some(e), .. } => expr_ok(*e)?,
                DeclKind::Param { owner: Some(o), .. } => decl_ok(*o)?,
                DeclKind::Function { params, body, .. } => {
                    for &p in params {
                        decl_ok(p)?;
                    }
                    for stmt in Stmt::leaves(body.as_deref().unwrap_or_default()) {
                        match stmt {
                            Stmt::Expr { expr } => expr_ok(*expr)?,
                            Stmt::Return { value: Some(e) } => expr_ok(*e)?,
                            Stmt::Return { value: None } => {}
                            Stmt::Decl { decl } => decl_ok(*decl)?,
                            Stmt::Block { .. } => {}
                        }
                    }
                }
                _ => {}
            }
        }
        let mut has_parent = vec![false; self.exprs.len()];
        for (parent, expr) in self.exprs.iter().enumerate() {
            match expr {
                Expr::DeclRef { decl } | Expr::Member { field: decl, .. } => decl_ok(*decl)?,
                _ => {}
            }
            for child in expr.children() {
                expr_ok(child)?;
                if child.index() >= parent {
                    return Err(LoadError::CyclicExpr {
                        file: self.file.clone(),
                        expr: parent as u32,
                    });
                }
                if std::mem::replace(&mut has_parent[child.index()], true) {
                    return Err(LoadError::SharedExpr {
                        file: self.file.clone(),
                        expr: child.0,
                    });
                }
            }
        }
        Ok(())
    }
}
