//! Declarations, expressions and statements of one translation unit.

use crate::types::{FunctionType, Type};
use ptrsafe_common::Anchor;
use serde::{Deserialize, Serialize};

/// Index of a declaration in its unit's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl DeclId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an expression in its unit's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExprId(pub u32);

impl ExprId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    /// Position of the declared name; doubles as the declaration's anchor.
    pub loc: Anchor,
    /// Set when the declaration was produced by a macro expansion.
    #[serde(default)]
    pub in_macro: bool,
    pub kind: DeclKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Var {
        ty: Type,
        #[serde(default)]
        is_global: bool,
        /// Bounds-safe interface annotation written on the declaration.
        #[serde(default)]
        itype: Option<String>,
        #[serde(default)]
        init: Option<ExprId>,
    },
    Field {
        ty: Type,
        #[serde(default)]
        itype: Option<String>,
    },
    Function {
        ty: FunctionType,
        #[serde(default)]
        params: Vec<DeclId>,
        #[serde(default = "default_true")]
        is_global: bool,
        /// `Some` for a definition; the statements of its body.
        #[serde(default)]
        body: Option<Vec<Stmt>>,
    },
    Param {
        ty: Type,
        /// The function this parameter belongs to.
        #[serde(default)]
        owner: Option<DeclId>,
        #[serde(default)]
        itype: Option<String>,
    },
    Typedef {
        ty: Type,
    },
    EnumConstant {
        value: i64,
    },
}

fn default_true() -> bool {
    true
}

impl Decl {
    /// The declared type, for kinds that have one.
    pub fn ty(&self) -> Option<Type> {
        match &self.kind {
            DeclKind::Var { ty, .. }
            | DeclKind::Field { ty, .. }
            | DeclKind::Param { ty, .. }
            | DeclKind::Typedef { ty } => Some(ty.clone()),
            DeclKind::Function { ty, .. } => Some(Type::Function(ty.clone())),
            DeclKind::EnumConstant { .. } => None,
        }
    }

    pub fn itype(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Var { itype, .. }
            | DeclKind::Field { itype, .. }
            | DeclKind::Param { itype, .. } => itype.as_deref(),
            _ => None,
        }
    }

    /// Variables, fields, parameters and functions: the declarations that can
    /// carry constraint variables.
    pub fn is_declarator(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Var { .. }
                | DeclKind::Field { .. }
                | DeclKind::Function { .. }
                | DeclKind::Param { .. }
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclKind::Function { .. })
    }

    pub fn is_param(&self) -> bool {
        matches!(self.kind, DeclKind::Param { .. })
    }

    /// True for a function declaration that carries a body.
    pub fn has_body(&self) -> bool {
        matches!(self.kind, DeclKind::Function { body: Some(_), .. })
    }

    pub fn is_global_function(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Function {
                is_global: true,
                ..
            }
        )
    }

    pub fn function_params(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Function { params, .. } => params,
            _ => &[],
        }
    }

    pub fn body(&self) -> Option<&[Stmt]> {
        match &self.kind {
            DeclKind::Function { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Expr { expr: ExprId },
    Return { value: Option<ExprId> },
    /// A local declaration (its initializer, if any, is on the decl).
    Decl { decl: DeclId },
    /// A compound statement. Control flow does not affect the constraints,
    /// so `if` and loop bodies arrive as blocks of their statements and
    /// conditions as expression statements.
    Block { stmts: Vec<Stmt> },
}

impl Stmt {
    /// Leaf statements of `stmts` in source order, with blocks opened.
    pub fn leaves(stmts: &[Stmt]) -> Vec<&Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        let mut stack: Vec<&Stmt> = stmts.iter().rev().collect();
        while let Some(stmt) = stack.pop() {
            match stmt {
                Stmt::Block { stmts } => stack.extend(stmts.iter().rev()),
                leaf => out.push(leaf),
            }
        }
        out
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    And,
    Or,
    Comma,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Deref,
    AddrOf,
    Neg,
    Not,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    DeclRef {
        decl: DeclId,
    },
    Member {
        base: ExprId,
        field: DeclId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Subscript {
        base: ExprId,
        index: ExprId,
    },
    Call {
        callee: ExprId,
        #[serde(default)]
        args: Vec<ExprId>,
    },
    Conditional {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    StringLiteral {
        value: String,
    },
    IntLiteral {
        value: i64,
    },
    Paren {
        inner: ExprId,
    },
    ImplicitCast {
        inner: ExprId,
    },
    /// Temporary-binding wrapper the front end inserts around some operands.
    BindTemporary {
        inner: ExprId,
    },
    Cast {
        ty: Type,
        inner: ExprId,
    },
    SizeOf {
        ty: Type,
    },
}

impl Expr {
    /// Direct operand expressions, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Expr::Subscript { base, index } => vec![*base, *index],
            Expr::Call { callee, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*callee);
                out.extend(args.iter().copied());
                out
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => vec![*cond, *then, *otherwise],
            Expr::Member { base: inner, .. }
            | Expr::Unary { operand: inner, .. }
            | Expr::Paren { inner }
            | Expr::ImplicitCast { inner }
            | Expr::BindTemporary { inner }
            | Expr::Cast { inner, .. } => vec![*inner],
            Expr::DeclRef { .. }
            | Expr::StringLiteral { .. }
            | Expr::IntLiteral { .. }
            | Expr::SizeOf { .. } => Vec::new(),
        }
    }
}
