//! Constraint variables.
//!
//! A constraint variable is either a [`PointerVariable`] (one atom per level of
//! indirection) or a [`FunctionVariable`] (return and parameter slots). They
//! live in a [`CVarArena`] and refer to each other by [`CVarId`]; the only
//! edges are function → slot variables and pointer → attached function, so the
//! graph is a forest.

use ptrsafe_common::CVarId;
use ptrsafe_solver::{CVarSet, VarAtom};
use smallvec::SmallVec;

/// Atom sequence of a pointer variable, outermost level first.
pub type Atoms = SmallVec<[VarAtom; 2]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CVarKind {
    Pointer,
    Function,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerVariable {
    pub atoms: Atoms,
    /// Display form of the type left after all pointer levels.
    pub base_type: String,
    pub name: String,
    /// Signature of the pointee when this is a function pointer.
    pub function: Option<CVarId>,
    /// The outermost level was declared as an array.
    pub is_array: bool,
    /// Bounds-safe interface annotation, if the declaration carried one.
    pub itype: Option<String>,
}

impl PointerVariable {
    pub fn depth(&self) -> usize {
        self.atoms.len()
    }

    /// The variable one dereference down, sharing the inner atoms.
    ///
    /// `None` when no pointer level would remain.
    pub fn stripped(&self) -> Option<PointerVariable> {
        if self.atoms.len() < 2 {
            return None;
        }
        Some(PointerVariable {
            atoms: self.atoms[1..].iter().copied().collect(),
            base_type: self.base_type.clone(),
            name: self.name.clone(),
            function: self.function,
            is_array: self.is_array,
            itype: self.itype.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionVariable {
    pub name: String,
    /// More than one element only before linking forces them equal.
    pub returns: CVarSet,
    pub params: Vec<CVarSet>,
    pub has_body: bool,
    pub has_prototype: bool,
    /// Declared signature, kept for the linker's structural comparison.
    pub signature: Option<ptrsafe_ast::FunctionType>,
}

impl FunctionVariable {
    /// Empty signature used when a call target cannot be identified.
    pub fn placeholder() -> Self {
        FunctionVariable {
            name: String::new(),
            returns: CVarSet::new(),
            params: Vec::new(),
            has_body: false,
            has_prototype: false,
            signature: None,
        }
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintVariable {
    Pointer(PointerVariable),
    Function(FunctionVariable),
}

impl ConstraintVariable {
    pub fn kind(&self) -> CVarKind {
        match self {
            ConstraintVariable::Pointer(_) => CVarKind::Pointer,
            ConstraintVariable::Function(_) => CVarKind::Function,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ConstraintVariable::Pointer(p) => &p.name,
            ConstraintVariable::Function(f) => &f.name,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerVariable> {
        match self {
            ConstraintVariable::Pointer(p) => Some(p),
            ConstraintVariable::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionVariable> {
        match self {
            ConstraintVariable::Function(f) => Some(f),
            ConstraintVariable::Pointer(_) => None,
        }
    }
}

/// Owner of every constraint variable created during a run.
#[derive(Debug, Default)]
pub struct CVarArena {
    vars: Vec<ConstraintVariable>,
}

impl CVarArena {
    pub fn alloc(&mut self, var: ConstraintVariable) -> CVarId {
        let id = CVarId(self.vars.len() as u32);
        self.vars.push(var);
        id
    }

    /// Ids are only minted by this arena, so lookups cannot miss.
    pub fn get(&self, id: CVarId) -> &ConstraintVariable {
        &self.vars[id.index()]
    }

    pub fn kind(&self, id: CVarId) -> CVarKind {
        self.get(id).kind()
    }

    pub fn pointer(&self, id: CVarId) -> Option<&PointerVariable> {
        self.get(id).as_pointer()
    }

    pub fn function(&self, id: CVarId) -> Option<&FunctionVariable> {
        self.get(id).as_function()
    }

    /// The function variant reachable from `id`: itself, or the signature
    /// attached to a function pointer.
    pub fn reachable_function(&self, id: CVarId) -> Option<CVarId> {
        match self.get(id) {
            ConstraintVariable::Function(_) => Some(id),
            ConstraintVariable::Pointer(p) => p.function,
        }
    }

    /// Every atom used by a variable, including those of attached functions
    /// and of return/parameter slots.
    pub fn collect_atoms(&self, id: CVarId, out: &mut Vec<VarAtom>) {
        match self.get(id) {
            ConstraintVariable::Pointer(p) => {
                out.extend(p.atoms.iter().copied());
                if let Some(f) = p.function {
                    self.collect_atoms(f, out);
                }
            }
            ConstraintVariable::Function(f) => {
                for &r in &f.returns {
                    self.collect_atoms(r, out);
                }
                for slot in &f.params {
                    for &p in slot {
                        self.collect_atoms(p, out);
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
