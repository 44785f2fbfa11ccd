//! Errors raised while loading mappings and validating request input.

use std::fmt;

use thiserror::Error;

/// A single violation with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON Pointer to the violating value.
    pub instance_path: String,
    /// JSON Pointer to the rule that was violated.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    pub(crate) fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation points at `instance_path`.
    pub fn touches(&self, instance_path: &str) -> bool {
        self.violations.iter().any(|v| v.instance_path == instance_path)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A mapping document could not be turned into a [`crate::Mapping`].
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The document file could not be read.
    #[error("mapping read error for '{path}': {reason}")]
    Read {
        /// Path of the document.
        path: String,
        /// Reason the file could not be read.
        reason: String,
    },

    /// The document is not valid JSON or YAML.
    #[error("mapping parse error for '{path}': {reason}")]
    Parse {
        /// Path of the document.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The document does not conform to the mapping schema, or declares
    /// constraints that cannot be enforced.
    #[error("mapping validation failed:\n{violations}")]
    Invalid {
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// A schema-conforming document still failed to decode.
    #[error("mapping decode error: {0}")]
    Decode(String),

    /// The embedded mapping schema could not be compiled.
    #[error("mapping schema build error: {0}")]
    Build(String),
}

/// Request parameters or files failed their declared constraints.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid input for action '{action}':\n{violations}")]
pub struct ParamValidationError {
    /// Action whose contract was violated.
    pub action: String,
    /// Structured list of individual violations.
    pub violations: ValidationViolations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violations_display_one_per_line() {
        let v = ValidationViolations::from(vec![
            Violation::new("/user_id", "/params/user_id/required", "value is required"),
            Violation::new("", "", "document is empty"),
        ]);
        assert_eq!(
            v.to_string(),
            "  /user_id: value is required\n  (root): document is empty"
        );
        assert!(v.touches("/user_id"));
        assert!(!v.touches("/tags"));
    }
}
