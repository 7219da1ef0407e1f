//! Index over a template's `variables.json` tree.
//!
//! `variables.json` is an object of variable name → definition. Checks
//! resolve page variable references against this index and read each
//! variable's declared type.

use adx_json::{JsonTree, OffsetRange};

/// One declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDef {
    pub name: String,
    /// Range of the declaring property key in `variables.json`.
    pub name_range: OffsetRange,
    /// `variableType.type`, when declared (e.g. `"StringType"`).
    pub type_name: Option<String>,
}

/// All variables declared by one `variables.json`, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableIndex {
    variables: Vec<VariableDef>,
}

impl VariableIndex {
    /// Build the index from a parsed `variables.json` tree. A rootless
    /// tree yields an empty index.
    #[must_use]
    pub fn from_tree(tree: &JsonTree) -> Self {
        let Some(root) = tree.root() else {
            return Self::default();
        };
        let mut variables = Vec::new();
        for prop in tree.object_properties(root) {
            let Some(name) = tree.property_name(*prop) else {
                continue;
            };
            let Some(key) = tree.property_key(*prop) else {
                continue;
            };
            let type_name = tree
                .property_value(*prop)
                .and_then(|value| tree.object_get(value, "variableType"))
                .and_then(|vt| tree.object_get(vt, "type"))
                .and_then(|t| tree.string_value(t))
                .map(ToString::to_string);
            variables.push(VariableDef {
                name: name.to_string(),
                name_range: tree.span(key),
                type_name,
            });
        }
        Self { variables }
    }

    /// Declared variables in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    /// Look up a variable by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableDef> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Declared names in declaration order, for fuzzy matching.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}
