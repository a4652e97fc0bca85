//! In-memory construction of translation units.
//!
//! The builder hands out `DeclId`/`ExprId`s as nodes are added. Columns are
//! assigned per line in insertion order, so two builders that add the same
//! declarations in the same order (e.g. two units including one header)
//! produce identical anchors.

use crate::node::{BinaryOp, Decl, DeclId, DeclKind, Expr, ExprId, Stmt, UnaryOp};
use crate::types::{FunctionType, Type};
use crate::unit::TranslationUnit;
use ptrsafe_common::{Anchor, UnitId};
use rustc_hash::FxHashMap;

pub struct UnitBuilder {
    unit: TranslationUnit,
    current_file: String,
    next_column: FxHashMap<(String, u32), u32>,
}

impl UnitBuilder {
    pub fn new(id: UnitId, file: &str) -> Self {
        UnitBuilder {
            unit: TranslationUnit {
                id,
                file: file.to_string(),
                ..TranslationUnit::default()
            },
            current_file: file.to_string(),
            next_column: FxHashMap::default(),
        }
    }

    /// Subsequent declarations are located in `file` (e.g. an included header).
    pub fn in_file(&mut self, file: &str) -> &mut Self {
        self.current_file = file.to_string();
        self
    }

    /// Subsequent declarations are located back in the unit's main file.
    pub fn in_main_file(&mut self) -> &mut Self {
        self.current_file = self.unit.file.clone();
        self
    }

    fn next_loc(&mut self, line: u32) -> Anchor {
        let column = self
            .next_column
            .entry((self.current_file.clone(), line))
            .or_insert(1);
        let loc = Anchor::new(self.current_file.clone(), line, *column);
        *column += 4;
        loc
    }

    fn push_decl(&mut self, name: &str, line: u32, kind: DeclKind) -> DeclId {
        let loc = self.next_loc(line);
        let id = DeclId(self.unit.decls.len() as u32);
        self.unit.decls.push(Decl {
            name: name.to_string(),
            loc,
            in_macro: false,
            kind,
        });
        id
    }

    fn push_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.unit.exprs.len() as u32);
        self.unit.exprs.push(expr);
        id
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// A file-scope variable.
    pub fn global(&mut self, name: &str, ty: Type, line: u32) -> DeclId {
        let id = self.push_decl(
            name,
            line,
            DeclKind::Var {
                ty,
                is_global: true,
                itype: None,
                init: None,
            },
        );
        self.unit.top_level.push(id);
        id
    }

    /// A block-scope variable; introduce it in a body with [`Stmt::Decl`].
    pub fn local(&mut self, name: &str, ty: Type, line: u32) -> DeclId {
        self.push_decl(
            name,
            line,
            DeclKind::Var {
                ty,
                is_global: false,
                itype: None,
                init: None,
            },
        )
    }

    pub fn field(&mut self, name: &str, ty: Type, line: u32) -> DeclId {
        let id = self.push_decl(name, line, DeclKind::Field { ty, itype: None });
        self.unit.top_level.push(id);
        id
    }

    /// A parameter; it is attached to its owner when the function is added.
    pub fn param(&mut self, name: &str, ty: Type, line: u32) -> DeclId {
        self.push_decl(
            name,
            line,
            DeclKind::Param {
                ty,
                owner: None,
                itype: None,
            },
        )
    }

    pub fn typedef(&mut self, name: &str, ty: Type, line: u32) -> DeclId {
        let id = self.push_decl(name, line, DeclKind::Typedef { ty });
        self.unit.top_level.push(id);
        id
    }

    pub fn enum_constant(&mut self, name: &str, value: i64, line: u32) -> DeclId {
        let id = self.push_decl(name, line, DeclKind::EnumConstant { value });
        self.unit.top_level.push(id);
        id
    }

    /// A prototype `ret name(params);`.
    pub fn declare_fn(&mut self, name: &str, ret: Type, params: Vec<DeclId>, line: u32) -> DeclId {
        self.add_function(name, ret, params, None, true, line)
    }

    /// A K&R declaration `ret name();` with no prototype.
    pub fn declare_fn_no_proto(&mut self, name: &str, ret: Type, line: u32) -> DeclId {
        let id = self.add_function(name, ret, Vec::new(), None, true, line);
        if let DeclKind::Function { ty, .. } = &mut self.unit.decls[id.index()].kind {
            ty.has_prototype = false;
        }
        id
    }

    /// A definition `ret name(params) { body }`.
    pub fn define_fn(
        &mut self,
        name: &str,
        ret: Type,
        params: Vec<DeclId>,
        body: Vec<Stmt>,
        line: u32,
    ) -> DeclId {
        self.add_function(name, ret, params, Some(body), true, line)
    }

    /// A `static` definition, invisible to other units.
    pub fn define_static_fn(
        &mut self,
        name: &str,
        ret: Type,
        params: Vec<DeclId>,
        body: Vec<Stmt>,
        line: u32,
    ) -> DeclId {
        self.add_function(name, ret, params, Some(body), false, line)
    }

    fn add_function(
        &mut self,
        name: &str,
        ret: Type,
        params: Vec<DeclId>,
        body: Option<Vec<Stmt>>,
        is_global: bool,
        line: u32,
    ) -> DeclId {
        let param_types = params
            .iter()
            .filter_map(|&p| self.unit.decl(p).ty())
            .collect();
        let id = self.push_decl(
            name,
            line,
            DeclKind::Function {
                ty: FunctionType::new(ret, param_types),
                params: params.clone(),
                is_global,
                body,
            },
        );
        for p in params {
            if let DeclKind::Param { owner, .. } = &mut self.unit.decls[p.index()].kind {
                *owner = Some(id);
            }
        }
        self.unit.top_level.push(id);
        id
    }

    /// Mark a function's type as variadic (`...`).
    pub fn set_variadic(&mut self, func: DeclId) -> &mut Self {
        if let DeclKind::Function { ty, .. } = &mut self.unit.decls[func.index()].kind {
            ty.variadic = true;
        }
        self
    }

    /// Mark a declaration as coming from a macro expansion.
    pub fn in_macro(&mut self, decl: DeclId) -> &mut Self {
        self.unit.decls[decl.index()].in_macro = true;
        self
    }

    pub fn set_init(&mut self, var: DeclId, init: ExprId) -> &mut Self {
        if let DeclKind::Var { init: slot, .. } = &mut self.unit.decls[var.index()].kind {
            *slot = Some(init);
        }
        self
    }

    pub fn set_itype(&mut self, decl: DeclId, annotation: &str) -> &mut Self {
        match &mut self.unit.decls[decl.index()].kind {
            DeclKind::Var { itype, .. }
            | DeclKind::Field { itype, .. }
            | DeclKind::Param { itype, .. } => *itype = Some(annotation.to_string()),
            _ => {}
        }
        self
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn decl_ref(&mut self, decl: DeclId) -> ExprId {
        self.push_expr(Expr::DeclRef { decl })
    }

    pub fn member(&mut self, base: ExprId, field: DeclId) -> ExprId {
        self.push_expr(Expr::Member { base, field })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.push_expr(Expr::Binary { op, lhs, rhs })
    }

    pub fn assign(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Assign, lhs, rhs)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.push_expr(Expr::Unary { op, operand })
    }

    pub fn deref(&mut self, operand: ExprId) -> ExprId {
        self.unary(UnaryOp::Deref, operand)
    }

    pub fn subscript(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.push_expr(Expr::Subscript { base, index })
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.push_expr(Expr::Call { callee, args })
    }

    pub fn conditional(&mut self, cond: ExprId, then: ExprId, otherwise: ExprId) -> ExprId {
        self.push_expr(Expr::Conditional {
            cond,
            then,
            otherwise,
        })
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.push_expr(Expr::StringLiteral {
            value: value.to_string(),
        })
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.push_expr(Expr::IntLiteral { value })
    }

    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        self.push_expr(Expr::Paren { inner })
    }

    pub fn implicit_cast(&mut self, inner: ExprId) -> ExprId {
        self.push_expr(Expr::ImplicitCast { inner })
    }

    pub fn bind_temporary(&mut self, inner: ExprId) -> ExprId {
        self.push_expr(Expr::BindTemporary { inner })
    }

    pub fn cast(&mut self, ty: Type, inner: ExprId) -> ExprId {
        self.push_expr(Expr::Cast { ty, inner })
    }

    pub fn size_of(&mut self, ty: Type) -> ExprId {
        self.push_expr(Expr::SizeOf { ty })
    }

    /// The finished unit.
    pub fn build(self) -> TranslationUnit {
        self.unit
    }

    /// Read access while building, e.g. to look up an anchor in a test.
    pub fn unit(&self) -> &TranslationUnit {
        &self.unit
    }
}

/// Statement shorthands for building bodies.
impl Stmt {
    pub fn expr(expr: ExprId) -> Stmt {
        Stmt::Expr { expr }
    }

    pub fn ret(value: Option<ExprId>) -> Stmt {
        Stmt::Return { value }
    }

    pub fn decl(decl: DeclId) -> Stmt {
        Stmt::Decl { decl }
    }

    pub fn block(stmts: Vec<Stmt>) -> Stmt {
        Stmt::Block { stmts }
    }
}
