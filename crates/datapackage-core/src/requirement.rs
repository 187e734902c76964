use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Names of the table schemas actually present in a data package.
pub type PresenceSet = BTreeSet<String>;

/// Declares which table schemas must, may or must not appear together.
///
/// Requirements nest: `all_of`, `any_of` and `one_of` hold child requirements
/// that are evaluated against the same presence set. Every list defaults to
/// empty, and a node with no rules at all is always satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSchemaRequirement {
    /// Free-text label, used only in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The node applies only when at least one of these tables is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applicable_if_present_any: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<TableSchemaRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<TableSchemaRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<TableSchemaRequirement>,
    /// Tables that must all be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Tables of which at least one must be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_any: Vec<String>,
    /// Tables that must not be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibited: Vec<String>,
}

impl TableSchemaRequirement {
    /// Returns true when the node carries no rule and therefore always passes.
    ///
    /// `applicable_if_present_any` is not a rule on its own and is ignored.
    pub fn has_no_rules(&self) -> bool {
        self.all_of.is_empty()
            && self.any_of.is_empty()
            && self.one_of.is_empty()
            && self.required.is_empty()
            && self.required_any.is_empty()
            && self.prohibited.is_empty()
    }

    /// Number of node levels in the tree, counting this node as one.
    pub fn depth(&self) -> usize {
        1 + self
            .all_of
            .iter()
            .chain(&self.any_of)
            .chain(&self.one_of)
            .map(TableSchemaRequirement::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every table name mentioned anywhere in the tree, sorted.
    pub fn referenced_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        for name in self
            .applicable_if_present_any
            .iter()
            .chain(&self.required)
            .chain(&self.required_any)
            .chain(&self.prohibited)
        {
            names.insert(name.as_str());
        }
        for child in self.all_of.iter().chain(&self.any_of).chain(&self.one_of) {
            child.collect_names(names);
        }
    }
}

/// Renders the node by its description, or by its populated fields.
impl fmt::Display for TableSchemaRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            return f.write_str(description);
        }

        let mut parts = Vec::new();
        let names = [
            ("applicableIfPresentAny", &self.applicable_if_present_any),
            ("required", &self.required),
            ("requiredAny", &self.required_any),
            ("prohibited", &self.prohibited),
        ];
        for (label, values) in names {
            if !values.is_empty() {
                parts.push(format!("{label}: {}", format_list(values)));
            }
        }
        let children = [
            ("allOf", &self.all_of),
            ("anyOf", &self.any_of),
            ("oneOf", &self.one_of),
        ];
        for (label, values) in children {
            if !values.is_empty() {
                parts.push(format!("{label}: {}", format_list(values)));
            }
        }

        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Formats items as `[a, b, c]`, preserving input order.
pub(crate) fn format_list<T: fmt::Display>(items: &[T]) -> String {
    let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
