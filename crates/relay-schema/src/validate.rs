//! # Request Validation
//!
//! Applies an [`ActionSchema`] to the parameters and files of an inbound
//! request before user code sees them.
//!
//! ## Rules
//!
//! - An absent parameter with a default is filled with the default, typed by
//!   the schema and located at the schema's HTTP input.
//! - An absent parameter that is `required` and has no default is a
//!   violation. The type catalog's zero value is never substituted.
//! - HTTP delivers scalars and arrays as strings. Present values are coerced
//!   to the declared type first (arrays are split by `array_format`) and
//!   then checked against every declared constraint.
//! - An empty value skips the remaining constraints when `allow_empty` is
//!   set and is a violation otherwise.
//! - Parameters the schema does not declare pass through untouched.
//!
//! All violations of a request are collected before failing.

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use relay_core::{ParamType, ParamValue, Value};

use crate::action::ActionSchema;
use crate::error::{ParamValidationError, ValidationViolations, Violation};
use crate::file::FileSchema;
use crate::param::{ArrayFormat, ParamSchema};

/// The facts about an uploaded file that file schemas constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInput<'a> {
    /// File parameter name.
    pub name: &'a str,
    /// MIME type.
    pub mime: &'a str,
    /// Size in bytes.
    pub size: u64,
}

/// Validate inbound parameters and produce the effective parameter list.
///
/// Declared parameters come first, ordered by name, followed by undeclared
/// ones in their original order.
///
/// # Errors
///
/// [`ParamValidationError`] listing every violation found.
pub fn validate_params(
    action: &ActionSchema,
    params: &[ParamValue],
) -> Result<Vec<ParamValue>, ParamValidationError> {
    let mut found = ValidationViolations::default();
    let mut effective = Vec::with_capacity(params.len());

    for schema in action.params() {
        let mut check = Check {
            schema,
            found: &mut found,
        };
        match params.iter().find(|p| p.name() == schema.name) {
            Some(param) => {
                if let Some(value) = check.param(param) {
                    effective.push(value);
                }
            }
            None => match &schema.default {
                Some(default) => {
                    let ty = if default.is_null() {
                        ParamType::Null
                    } else {
                        schema.ty
                    };
                    match ParamValue::new(schema.name.clone(), default.clone(), ty) {
                        Ok(p) => effective.push(p.at(schema.input())),
                        Err(e) => check.fail("default", e.to_string()),
                    }
                }
                None if schema.required => check.fail("required", "value is required"),
                None => {}
            },
        }
    }

    effective.extend(
        params
            .iter()
            .filter(|p| !action.has_param(p.name()))
            .cloned(),
    );

    if found.is_empty() {
        Ok(effective)
    } else {
        tracing::debug!(
            action = %action.name,
            violations = found.len(),
            "parameter validation failed"
        );
        Err(ParamValidationError {
            action: action.name.clone(),
            violations: found,
        })
    }
}

/// Validate uploaded files against the action's file schemas.
///
/// # Errors
///
/// [`ParamValidationError`] listing every violation found.
pub fn validate_files<'a>(
    action: &ActionSchema,
    files: impl IntoIterator<Item = FileInput<'a>>,
) -> Result<(), ParamValidationError> {
    let files: Vec<FileInput<'a>> = files.into_iter().collect();
    let mut found = ValidationViolations::default();

    for schema in action.files() {
        match files.iter().find(|f| f.name == schema.name) {
            Some(file) => check_file(schema, file, &mut found),
            None if schema.required => found.push(file_violation(schema, "required", "file is required")),
            None => {}
        }
    }

    if found.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            action = %action.name,
            violations = found.len(),
            "file validation failed"
        );
        Err(ParamValidationError {
            action: action.name.clone(),
            violations: found,
        })
    }
}

fn check_file(schema: &FileSchema, file: &FileInput<'_>, found: &mut ValidationViolations) {
    if !schema.accepts_mime(file.mime) {
        found.push(file_violation(
            schema,
            "mime",
            format!("MIME type {} is not one of {}", file.mime, schema.mime),
        ));
    }
    let size = file.size as f64;
    if let Some(max) = schema.max {
        if above(size, max as f64, schema.exclusive_max) {
            found.push(file_violation(
                schema,
                "max",
                format!("size {} exceeds maximum {max}", file.size),
            ));
        }
    }
    if let Some(min) = schema.min {
        if below(size, min as f64, schema.exclusive_min) {
            found.push(file_violation(
                schema,
                "min",
                format!("size {} is below minimum {min}", file.size),
            ));
        }
    }
}

fn file_violation(schema: &FileSchema, rule: &str, message: impl Into<String>) -> Violation {
    Violation::new(
        format!("/files/{}", schema.name),
        format!("/files/{}/{rule}", schema.name),
        message,
    )
}

fn above(value: f64, max: f64, exclusive: bool) -> bool {
    if exclusive {
        value >= max
    } else {
        value > max
    }
}

fn below(value: f64, min: f64, exclusive: bool) -> bool {
    if exclusive {
        value <= min
    } else {
        value < min
    }
}

/// Constraint checks of one declared parameter.
struct Check<'s, 'f> {
    schema: &'s ParamSchema,
    found: &'f mut ValidationViolations,
}

impl Check<'_, '_> {
    fn fail(&mut self, rule: &str, message: impl Into<String>) {
        let name = &self.schema.name;
        self.found.push(Violation::new(
            format!("/params/{name}"),
            format!("/params/{name}/{rule}"),
            message,
        ));
    }

    fn param(&mut self, param: &ParamValue) -> Option<ParamValue> {
        let schema = self.schema;
        let Some(value) = coerce(schema, param.value()) else {
            self.fail(
                "type",
                format!("{} value is not a valid {}", param.value().kind(), schema.ty),
            );
            return None;
        };

        if value.is_empty_container() {
            if !schema.allow_empty {
                self.fail("allow_empty", "empty value is not allowed");
            }
        } else {
            self.constraints(&value);
        }

        match ParamValue::new(schema.name.clone(), value, schema.ty) {
            Ok(p) => Some(p.at(param.location())),
            Err(e) => {
                self.fail("type", e.to_string());
                None
            }
        }
    }

    fn constraints(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.string(s),
            Value::Int(i) => self.number(*i as f64),
            Value::Float(f) => self.number(*f),
            Value::List(items) => self.list(items),
            _ => {}
        }
        if !matches!(value, Value::List(_)) {
            self.allowed(value);
        }
    }

    fn string(&mut self, s: &str) {
        let schema = self.schema;
        if !format_matches(&schema.format, s) {
            self.fail("format", format!("value is not a valid {}", schema.format));
        }
        if let Some(pattern) = &schema.pattern {
            match Regex::new(pattern) {
                Ok(re) if re.is_match(s) => {}
                Ok(_) => self.fail("pattern", format!("value does not match pattern {pattern}")),
                Err(e) => self.fail("pattern", format!("pattern does not compile: {e}")),
            }
        }
        let len = s.chars().count();
        if let Some(max) = schema.max_length {
            if len > max {
                self.fail("max_length", format!("length {len} exceeds maximum {max}"));
            }
        }
        if let Some(min) = schema.min_length {
            if len < min {
                self.fail("min_length", format!("length {len} is below minimum {min}"));
            }
        }
    }

    fn number(&mut self, n: f64) {
        let schema = self.schema;
        if let Some(max) = schema.max {
            if above(n, max, schema.exclusive_max) {
                self.fail("max", format!("{n} exceeds maximum {max}"));
            }
        }
        if let Some(min) = schema.min {
            if below(n, min, schema.exclusive_min) {
                self.fail("min", format!("{n} is below minimum {min}"));
            }
        }
        if let Some(divisor) = schema.multiple_of {
            let quotient = n / divisor;
            if (quotient - quotient.round()).abs() > 1e-9 {
                self.fail("multiple_of", format!("{n} is not a multiple of {divisor}"));
            }
        }
    }

    fn list(&mut self, items: &[Value]) {
        let schema = self.schema;
        let count = items.len();
        if let Some(max) = schema.max_items {
            if count > max {
                self.fail("max_items", format!("{count} items exceed maximum {max}"));
            }
        }
        if let Some(min) = schema.min_items {
            if count < min {
                self.fail("min_items", format!("{count} items are below minimum {min}"));
            }
        }
        if schema.unique_items {
            let repeated = items
                .iter()
                .enumerate()
                .any(|(i, item)| items[..i].contains(item));
            if repeated {
                self.fail("unique_items", "items are not unique");
            }
        }
        if let Some(item_type) = schema.items {
            if let Some(bad) = items.iter().find(|item| !item_type.accepts(item)) {
                self.fail("items", format!("item {bad} is not a valid {item_type}"));
            }
        }
        for item in items {
            self.allowed(item);
        }
    }

    fn allowed(&mut self, value: &Value) {
        let allowed = &self.schema.allowed;
        if !allowed.is_empty() && !allowed.contains(value) {
            self.fail("enum", format!("{value} is not an allowed value"));
        }
    }
}

/// Bring a wire value to the declared type, or `None` if it cannot be.
fn coerce(schema: &ParamSchema, value: &Value) -> Option<Value> {
    match (schema.ty, value) {
        (ParamType::Array, Value::String(s)) => Some(Value::List(split(schema, s))),
        (ParamType::Array, _) => value
            .sequence()
            .filter(|_| schema.ty.accepts(value))
            .map(|items| Value::List(items.into_iter().map(|i| coerce_item(schema, i)).collect())),
        (ty, v) if ty.accepts(v) => Some(v.clone()),
        (ty, Value::String(s)) => ty.coerce_str(s),
        (ParamType::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
        _ => None,
    }
}

fn split(schema: &ParamSchema, text: &str) -> Vec<Value> {
    if text.is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = match schema.array_format {
        ArrayFormat::Multi => vec![text],
        format => match format.separator() {
            Some(sep) => text.split(sep).collect(),
            None => vec![text],
        },
    };
    parts
        .into_iter()
        .map(|part| coerce_item(schema, &Value::String(part.to_string())))
        .collect()
}

fn coerce_item(schema: &ParamSchema, item: &Value) -> Value {
    match (schema.items, item) {
        (Some(ty), Value::String(s)) if !ty.accepts(item) => {
            ty.coerce_str(s).unwrap_or_else(|| item.clone())
        }
        _ => item.clone(),
    }
}

fn format_matches(format: &str, s: &str) -> bool {
    match format {
        "uuid" => uuid::Uuid::parse_str(s).is_ok(),
        "date" => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        "date-time" => DateTime::parse_from_rfc3339(s).is_ok(),
        _ => true,
    }
}
