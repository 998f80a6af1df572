//! The four name tables of an interpreter
//!
//! A name is bound in at most one table at any instant: binding it in one
//! table removes it from the other three.

use crate::lexer::TokenSeq;
use crate::memory::{StructDef, Value};
use rustc_hash::FxHashMap;

/// Which table a name currently lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Variable,
    Procedure,
    Struct,
    Macro,
}

#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    variables: FxHashMap<String, Value>,
    procedures: FxHashMap<String, TokenSeq>,
    structs: FxHashMap<String, StructDef>,
    macros: FxHashMap<String, TokenSeq>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    fn unbind_except(&mut self, name: &str, keep: NameKind) {
        if keep != NameKind::Variable {
            self.variables.remove(name);
        }
        if keep != NameKind::Procedure {
            self.procedures.remove(name);
        }
        if keep != NameKind::Struct {
            self.structs.remove(name);
        }
        if keep != NameKind::Macro {
            self.macros.remove(name);
        }
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.unbind_except(&name, NameKind::Variable);
        self.variables.insert(name, value);
    }

    pub fn set_procedure(&mut self, name: impl Into<String>, body: TokenSeq) {
        let name = name.into();
        self.unbind_except(&name, NameKind::Procedure);
        self.procedures.insert(name, body);
    }

    pub fn set_struct(&mut self, def: StructDef) {
        self.unbind_except(&def.name, NameKind::Struct);
        self.structs.insert(def.name.clone(), def);
    }

    pub fn set_macro(&mut self, name: impl Into<String>, body: TokenSeq) {
        let name = name.into();
        self.unbind_except(&name, NameKind::Macro);
        self.macros.insert(name, body);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn procedure(&self, name: &str) -> Option<&TokenSeq> {
        self.procedures.get(name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn macro_body(&self, name: &str) -> Option<&TokenSeq> {
        self.macros.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<NameKind> {
        if self.variables.contains_key(name) {
            Some(NameKind::Variable)
        } else if self.procedures.contains_key(name) {
            Some(NameKind::Procedure)
        } else if self.structs.contains_key(name) {
            Some(NameKind::Struct)
        } else if self.macros.contains_key(name) {
            Some(NameKind::Macro)
        } else {
            None
        }
    }

    /// Variables sorted by name
    pub fn sorted_variables(&self) -> Vec<(String, Value)> {
        let mut vars: Vec<(String, Value)> = self
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    pub fn procedure_names(&self) -> Vec<String> {
        sorted_keys(&self.procedures)
    }

    pub fn struct_names(&self) -> Vec<String> {
        sorted_keys(&self.structs)
    }

    pub fn macro_names(&self) -> Vec<String> {
        sorted_keys(&self.macros)
    }
}

fn sorted_keys<V>(map: &FxHashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_binding_is_exclusive_across_tables() {
        let mut ns = Namespaces::new();
        ns.set_variable("x", Value::Int(1));
        assert_eq!(ns.kind_of("x"), Some(NameKind::Variable));

        ns.set_procedure("x", Arc::from(Vec::new()));
        assert_eq!(ns.kind_of("x"), Some(NameKind::Procedure));
        assert!(ns.variable("x").is_none());

        ns.set_macro("x", Arc::from(Vec::new()));
        assert!(ns.procedure("x").is_none());
        assert_eq!(ns.macro_names(), vec!["x"]);
    }
}
