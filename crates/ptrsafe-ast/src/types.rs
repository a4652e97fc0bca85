//! Declarator types as the front end reports them.
//!
//! Types are owned trees rather than interned ids: a constraint variable keeps
//! the display form of its base type, and the linker compares signatures that
//! come from different (already closed) translation units.

use ptrsafe_common::limits::MAX_TYPE_COMPARE_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A C declarator type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// `int`, `char`, `void`, `unsigned long`, ...
    Builtin(String),
    /// `T *`
    Pointer(Box<Type>),
    /// `T [N]` or `T []`
    Array {
        elem: Box<Type>,
        #[serde(default)]
        size: Option<u64>,
    },
    /// A function type (not a pointer to one).
    Function(FunctionType),
    /// `struct S` / `union U`
    Record(String),
    /// A typedef name together with what it stands for.
    Typedef { name: String, underlying: Box<Type> },
}

/// Signature of a function type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub ret: Box<Type>,
    #[serde(default)]
    pub params: Vec<Type>,
    #[serde(default)]
    pub variadic: bool,
    /// False for K&R-style `int f();` declarations.
    #[serde(default = "default_true")]
    pub has_prototype: bool,
}

fn default_true() -> bool {
    true
}

impl FunctionType {
    pub fn new(ret: Type, params: Vec<Type>) -> Self {
        FunctionType {
            ret: Box::new(ret),
            params,
            variadic: false,
            has_prototype: true,
        }
    }
}

impl Type {
    pub fn int() -> Type {
        Type::Builtin("int".to_string())
    }

    pub fn char() -> Type {
        Type::Builtin("char".to_string())
    }

    pub fn void() -> Type {
        Type::Builtin("void".to_string())
    }

    pub fn ptr(inner: Type) -> Type {
        Type::Pointer(Box::new(inner))
    }

    pub fn array(elem: Type, size: Option<u64>) -> Type {
        Type::Array {
            elem: Box::new(elem),
            size,
        }
    }

    pub fn func(ret: Type, params: Vec<Type>) -> Type {
        Type::Function(FunctionType::new(ret, params))
    }

    pub fn record(name: &str) -> Type {
        Type::Record(name.to_string())
    }

    pub fn typedef(name: &str, underlying: Type) -> Type {
        Type::Typedef {
            name: name.to_string(),
            underlying: Box::new(underlying),
        }
    }

    /// Look through any typedef layers.
    pub fn canonical(&self) -> &Type {
        let mut ty = self;
        while let Type::Typedef { underlying, .. } = ty {
            ty = underlying;
        }
        ty
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.canonical(), Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.canonical(), Type::Array { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.canonical(), Type::Function(_))
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.canonical() {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The pointee or element type of one pointer/array level.
    pub fn pointee(&self) -> Option<&Type> {
        match self.canonical() {
            Type::Pointer(inner) => Some(inner),
            Type::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Number of pointer or array levels before reaching a non-indirect type.
    pub fn pointer_depth(&self) -> usize {
        let mut depth = 0;
        let mut ty = self;
        while let Some(inner) = ty.pointee() {
            depth += 1;
            ty = inner;
        }
        depth
    }

    /// The type left after stripping every pointer/array level.
    pub fn base(&self) -> &Type {
        let mut ty = self;
        while let Some(inner) = ty.pointee() {
            ty = inner;
        }
        ty
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Builtin(name) => f.write_str(name),
            Type::Pointer(inner) => write!(f, "{inner} *"),
            Type::Array {
                elem,
                size: Some(n),
            } => write!(f, "{elem} [{n}]"),
            Type::Array { elem, size: None } => write!(f, "{elem} []"),
            Type::Function(func) => {
                write!(f, "{} (", func.ret)?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                if func.variadic {
                    if !func.params.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("...")?;
                }
                f.write_str(")")
            }
            Type::Record(name) => write!(f, "struct {name}"),
            Type::Typedef { name, .. } => f.write_str(name),
        }
    }
}

/// Structural type equality.
///
/// This is a total procedure: typedefs are transparent, builtins and records
/// compare by name, pointers and arrays recurse into their pointee (array
/// sizes must agree when both are known), and function types compare return
/// type, arity, variadic-ness and every parameter. Only when the comparison
/// nests deeper than [`MAX_TYPE_COMPARE_DEPTH`] does it answer `false`
/// without a proof, so callers must still read `false` as "not shown equal".
pub fn structurally_equal(a: &Type, b: &Type) -> bool {
    equal_at_depth(a, b, 0)
}

fn equal_at_depth(a: &Type, b: &Type, depth: u32) -> bool {
    if depth > MAX_TYPE_COMPARE_DEPTH {
        return false;
    }
    if a == b {
        return true;
    }
    match (a.canonical(), b.canonical()) {
        (Type::Builtin(x), Type::Builtin(y)) => x == y,
        (Type::Record(x), Type::Record(y)) => x == y,
        (Type::Pointer(x), Type::Pointer(y)) => equal_at_depth(x, y, depth + 1),
        (
            Type::Array {
                elem: x,
                size: sx,
            },
            Type::Array {
                elem: y,
                size: sy,
            },
        ) => {
            let sizes_agree = match (sx, sy) {
                (Some(m), Some(n)) => m == n,
                _ => true,
            };
            sizes_agree && equal_at_depth(x, y, depth + 1)
        }
        (Type::Function(x), Type::Function(y)) => {
            x.variadic == y.variadic
                && x.params.len() == y.params.len()
                && equal_at_depth(&x.ret, &y.ret, depth + 1)
                && x
                    .params
                    .iter()
                    .zip(&y.params)
                    .all(|(p, q)| equal_at_depth(p, q, depth + 1))
        }
        _ => false,
    }
}
