use super::types::{NodeId, Variable};
use crate::error::SearchError;
use std::collections::HashMap;

/// Owns the variables of a search. `NodeId(i)` is the i-th registered variable.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    by_name: HashMap<String, NodeId>,
}

impl VariableRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.variables.len() }
    pub fn is_empty(&self) -> bool { self.variables.is_empty() }

    /// Builds a registry from the oracle's ordered variable list.
    pub fn from_variables(variables: &[Variable]) -> Result<Self, SearchError> {
        let mut registry = Self::new();
        for v in variables {
            registry.add(v.clone())?;
        }
        Ok(registry)
    }

    /// Registers a variable. Names are the identity used by background knowledge,
    /// so a second variable with the same name is rejected.
    pub fn add(&mut self, variable: Variable) -> Result<NodeId, SearchError> {
        if self.by_name.contains_key(&variable.name) {
            return Err(SearchError::DuplicateVariable(variable.name));
        }
        let id = NodeId::new(self.variables.len());
        self.by_name.insert(variable.name.clone(), id);
        self.variables.push(variable);
        Ok(id)
    }

    #[inline(always)]
    pub fn get(&self, id: NodeId) -> &Variable { &self.variables[id.index()] }

    pub fn name(&self, id: NodeId) -> &str { &self.variables[id.index()].name }

    pub fn id_of(&self, name: &str) -> Result<NodeId, SearchError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SearchError::UnknownVariable(name.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.variables.len()).map(NodeId::new)
    }

    pub fn variables(&self) -> &[Variable] { &self.variables }
}
