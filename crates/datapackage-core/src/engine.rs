use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::requirement::{PresenceSet, TableSchemaRequirement, format_list};

/// Default nesting limit for requirement trees.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Verdict of evaluating a requirement tree against a presence set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    reason: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: String::new(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Human-readable explanation; empty when valid.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            f.write_str("valid")
        } else {
            write!(f, "invalid: {}", self.reason)
        }
    }
}

/// How `all_of` reports failing children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReasonMode {
    /// Each failing child overwrites the reason; the last failure wins.
    #[default]
    LastFailure,
    /// Reasons of every failing child are joined with `; `.
    CollectAll,
}

/// Receives diagnostics while a tree is evaluated. Never affects verdicts.
pub trait RequirementObserver {
    /// Called after a node has been evaluated.
    fn evaluated(&self, _requirement: &TableSchemaRequirement, _result: &ValidationResult) {}

    /// Called for each `one_of` child that validates.
    fn one_of_matched(&self, _requirement: &TableSchemaRequirement) {}
}

/// Observer that forwards diagnostics as `tracing` debug events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequirementObserver for TracingObserver {
    fn one_of_matched(&self, requirement: &TableSchemaRequirement) {
        tracing::debug!(event = "one_of_matched", requirement = %requirement);
    }
}

/// Evaluates requirement trees against presence sets.
#[derive(Clone, Copy)]
pub struct RequirementValidator<'a> {
    max_depth: usize,
    reason_mode: ReasonMode,
    observer: &'a dyn RequirementObserver,
}

impl fmt::Debug for RequirementValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequirementValidator")
            .field("max_depth", &self.max_depth)
            .field("reason_mode", &self.reason_mode)
            .finish_non_exhaustive()
    }
}

impl Default for RequirementValidator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RequirementValidator<'a> {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            reason_mode: ReasonMode::default(),
            observer: &TracingObserver,
        }
    }

    /// Maximum number of node levels, the root counting as one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_reason_mode(mut self, reason_mode: ReasonMode) -> Self {
        self.reason_mode = reason_mode;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn RequirementObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Decide whether `presence` satisfies `requirement`.
    ///
    /// Fails only when the tree nests deeper than the configured limit.
    pub fn validate(
        &self,
        presence: &PresenceSet,
        requirement: &TableSchemaRequirement,
    ) -> Result<ValidationResult> {
        self.validate_node(presence, requirement, 1)
    }

    fn validate_node(
        &self,
        presence: &PresenceSet,
        node: &TableSchemaRequirement,
        depth: usize,
    ) -> Result<ValidationResult> {
        if depth > self.max_depth {
            return Err(Error::MaxDepthExceeded {
                limit: self.max_depth,
            });
        }

        let result = self.evaluate(presence, node, depth)?;
        self.observer.evaluated(node, &result);
        Ok(result)
    }

    fn evaluate(
        &self,
        presence: &PresenceSet,
        node: &TableSchemaRequirement,
        depth: usize,
    ) -> Result<ValidationResult> {
        if node.has_no_rules() {
            return Ok(ValidationResult::valid());
        }

        if !node.applicable_if_present_any.is_empty()
            && !intersects(presence, &node.applicable_if_present_any)
        {
            return Ok(ValidationResult::valid());
        }

        if !node.prohibited.is_empty() {
            let found = intersection(presence, &node.prohibited);
            if !found.is_empty() {
                return Ok(ValidationResult::invalid(format!(
                    "Prohibited schemas found: {}. The following schemas are prohibited: {}",
                    format_list(&found),
                    format_list(&node.prohibited)
                )));
            }
        }

        if !node.required.is_empty() && !node.required.iter().all(|name| presence.contains(name))
        {
            return Ok(ValidationResult::invalid(format!(
                "All required schemas must be present: {}",
                format_list(&node.required)
            )));
        }

        if !node.required_any.is_empty() && !intersects(presence, &node.required_any) {
            return Ok(ValidationResult::invalid(format!(
                "At least one of required schemas must be present: {}",
                format_list(&node.required_any)
            )));
        }

        // Only the first populated combinator is evaluated.
        if !node.all_of.is_empty() {
            self.all_of(presence, &node.all_of, depth)
        } else if !node.any_of.is_empty() {
            self.any_of(presence, &node.any_of, depth)
        } else if !node.one_of.is_empty() {
            self.one_of(presence, &node.one_of, depth)
        } else {
            Ok(ValidationResult::valid())
        }
    }

    fn all_of(
        &self,
        presence: &PresenceSet,
        children: &[TableSchemaRequirement],
        depth: usize,
    ) -> Result<ValidationResult> {
        let mut reasons = Vec::new();
        for child in children {
            let result = self.validate_node(presence, child, depth + 1)?;
            if !result.is_valid() {
                reasons.push(result.reason);
            }
        }

        if reasons.is_empty() {
            return Ok(ValidationResult::valid());
        }

        let reason = match self.reason_mode {
            ReasonMode::LastFailure => reasons.pop().unwrap_or_default(),
            ReasonMode::CollectAll => reasons.join("; "),
        };
        Ok(ValidationResult::invalid(reason))
    }

    fn any_of(
        &self,
        presence: &PresenceSet,
        children: &[TableSchemaRequirement],
        depth: usize,
    ) -> Result<ValidationResult> {
        for child in children {
            if self.validate_node(presence, child, depth + 1)?.is_valid() {
                return Ok(ValidationResult::valid());
            }
        }

        Ok(ValidationResult::invalid(format!(
            "At least one valid required, none found: {}",
            format_list(children)
        )))
    }

    fn one_of(
        &self,
        presence: &PresenceSet,
        children: &[TableSchemaRequirement],
        depth: usize,
    ) -> Result<ValidationResult> {
        let mut matched = 0usize;
        for child in children {
            if self.validate_node(presence, child, depth + 1)?.is_valid() {
                matched += 1;
                self.observer.one_of_matched(child);
            }
        }

        if matched == 1 {
            Ok(ValidationResult::valid())
        } else {
            Ok(ValidationResult::invalid(format!(
                "Only one required: {}",
                format_list(children)
            )))
        }
    }
}

/// Validate with the default limits, reason mode and tracing observer.
pub fn validate_requirements(
    presence: &PresenceSet,
    requirement: &TableSchemaRequirement,
) -> Result<ValidationResult> {
    RequirementValidator::new().validate(presence, requirement)
}

fn intersects(presence: &PresenceSet, names: &[String]) -> bool {
    names.iter().any(|name| presence.contains(name))
}

fn intersection<'n>(presence: &PresenceSet, names: &'n [String]) -> Vec<&'n str> {
    let mut found: Vec<&str> = Vec::new();
    for name in names {
        if presence.contains(name) && !found.contains(&name.as_str()) {
            found.push(name);
        }
    }
    found
}
