use crate::parser::ast::Ident;
use std::collections::HashMap;

/// Parameter bindings of a single call frame. There is no enclosing
/// environment: a function body only sees its own parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    store: HashMap<Ident, f64>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    /// Pairs `params` with `values` in order.
    pub fn bind(params: &[Ident], values: Vec<f64>) -> Self {
        let mut environment = Self::new();
        params
            .iter()
            .zip(values)
            .for_each(|(param, value)| environment.set(param, value));
        environment
    }

    pub fn get(&self, entry: &str) -> Option<f64> {
        self.store.get(entry).copied()
    }

    pub fn set(&mut self, key: &str, val: f64) {
        self.store.insert(key.to_string(), val);
    }
}
