//! Keyed registries pairing function declarations with definitions.

use indexmap::IndexMap;
use ptrsafe_common::{CVarId, FuncKey};
use rustc_hash::FxBuildHasher;
use std::collections::BTreeSet;

/// A set of constraint variables, ordered by creation.
pub type CVarSet = BTreeSet<CVarId>;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Definitions-by-key, declarations-by-key and definition-key to
/// declaration-key.
///
/// Maps keep insertion order so the repair pass visits functions in the order
/// their definitions were seen.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    definitions: FxIndexMap<FuncKey, CVarSet>,
    declarations: FxIndexMap<FuncKey, CVarSet>,
    defn_to_decl: FxIndexMap<FuncKey, FuncKey>,
}

impl FunctionRegistry {
    pub fn add_definition(&mut self, key: FuncKey, var: CVarId) {
        self.definitions.entry(key).or_default().insert(var);
    }

    pub fn add_declaration(&mut self, key: FuncKey, var: CVarId) {
        self.declarations.entry(key).or_default().insert(var);
    }

    pub fn link_definition(&mut self, defn: FuncKey, decl: FuncKey) {
        self.defn_to_decl.insert(defn, decl);
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&FuncKey, &CVarSet)> {
        self.definitions.iter()
    }

    pub fn declaration(&self, key: &FuncKey) -> Option<&CVarSet> {
        self.declarations.get(key)
    }

    /// Declaration key recorded for a definition key.
    pub fn declaration_key(&self, defn: &FuncKey) -> Option<&FuncKey> {
        self.defn_to_decl.get(defn)
    }

    /// Declaration variables paired with a definition through its key.
    pub fn declaration_for(&self, defn: &FuncKey) -> Option<&CVarSet> {
        self.declaration_key(defn)
            .and_then(|decl| self.declaration(decl))
    }
}
