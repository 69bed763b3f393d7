//! Wire contracts shared by the server and every client build.
//!
//! Each contract type implements [`Schema`], which validates an arbitrary JSON
//! value into the typed, normalized value. Validation never stops at the first
//! problem: every failing field path is collected into one [`ValidationError`].

use serde_json::{Map, Value};
use std::fmt;

pub mod auth;
pub mod error;
pub mod user;

/// Dotted path from the validated root to a field, e.g. `session.token_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<&'static str>);

impl FieldPath {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        f.write_str(&self.0.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The key is absent from its object.
    Missing,
    /// The key is present as `null` where only omission means absent.
    NullNotAllowed,
    WrongType { expected: &'static str, found: &'static str },
    Empty,
    Invalid(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required"),
            Self::NullNotAllowed => f.write_str("must be omitted instead of null"),
            Self::WrongType { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::Empty => f.write_str("must not be empty"),
            Self::Invalid(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: FieldPath,
    pub reason: Reason,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.reason)
    }
}

/// A value that did not conform to its schema. Always holds at least one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns true if any issue sits exactly at `path` (dotted form).
    #[must_use]
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path.to_string() == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates issues while walking a JSON value.
#[derive(Debug, Default)]
pub struct Validator {
    path: Vec<&'static str>,
    issues: Vec<Issue>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue at the current path.
    pub fn report(&mut self, reason: Reason) {
        self.issues.push(Issue { path: FieldPath(self.path.clone()), reason });
    }

    /// Records an issue at `field` below the current path.
    pub fn report_field(&mut self, field: &'static str, reason: Reason) {
        self.path.push(field);
        self.report(reason);
        self.path.pop();
    }

    pub fn object<'a>(&mut self, value: &'a Value) -> Option<&'a Map<String, Value>> {
        if let Some(map) = value.as_object() {
            Some(map)
        } else {
            self.report(Reason::WrongType { expected: "object", found: kind(value) });
            None
        }
    }

    /// A key that must be present and non-null.
    pub fn required<T: Schema>(&mut self, obj: &Map<String, Value>, field: &'static str) -> Option<T> {
        match obj.get(field) {
            None => {
                self.report_field(field, Reason::Missing);
                None
            }
            Some(value) => self.nested(field, value),
        }
    }

    /// A key that must be present; `null` is its only absent marker.
    pub fn nullable<T: Schema>(&mut self, obj: &Map<String, Value>, field: &'static str) -> Option<Option<T>> {
        match obj.get(field) {
            None => {
                self.report_field(field, Reason::Missing);
                None
            }
            Some(Value::Null) => Some(None),
            Some(value) => self.nested(field, value).map(Some),
        }
    }

    /// A key that may be omitted; omission is its only absent marker.
    pub fn optional<T: Schema>(&mut self, obj: &Map<String, Value>, field: &'static str) -> Option<Option<T>> {
        match obj.get(field) {
            None => Some(None),
            Some(Value::Null) => {
                self.report_field(field, Reason::NullNotAllowed);
                None
            }
            Some(value) => self.nested(field, value).map(Some),
        }
    }

    fn nested<T: Schema>(&mut self, field: &'static str, value: &Value) -> Option<T> {
        self.path.push(field);
        let parsed = T::read(self, value);
        self.path.pop();
        parsed
    }

    /// Converts the walk into a result. A value is only returned if no issue was recorded.
    ///
    /// # Errors
    /// Returns every collected issue.
    pub fn finish<T>(self, parsed: Option<T>) -> Result<T, ValidationError> {
        match parsed {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ if self.issues.is_empty() => Err(ValidationError {
                issues: vec![Issue { path: FieldPath::default(), reason: Reason::Invalid("rejected".into()) }],
            }),
            _ => Err(ValidationError { issues: self.issues }),
        }
    }
}

/// A type that can be validated out of untrusted JSON.
pub trait Schema: Sized {
    /// Reads `value` at the validator's current path, reporting every problem found.
    /// Returns `None` if the value is unusable.
    fn read(v: &mut Validator, value: &Value) -> Option<Self>;

    /// Validates a whole document against this schema.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] listing every failing field path.
    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new();
        let parsed = Self::read(&mut v, value);
        v.finish(parsed)
    }
}

impl Schema for String {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        if let Value::String(s) = value {
            Some(s.clone())
        } else {
            v.report(Reason::WrongType { expected: "string", found: kind(value) });
            None
        }
    }
}

/// Largest magnitude at which every whole `f64` is exactly representable.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Whole numbers. Integral floats such as `3600.0` are accepted; fractions are not.
impl Schema for i64 {
    #[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        if let Some(n) = value.as_i64() {
            return Some(n);
        }

        match value.as_f64() {
            Some(f) if f.trunc() == f && f.abs() <= MAX_EXACT_FLOAT => Some(f as Self),
            Some(_) => {
                v.report(Reason::Invalid("expected a whole number".into()));
                None
            }
            None => {
                v.report(Reason::WrongType { expected: "number", found: kind(value) });
                None
            }
        }
    }
}

/// Procedures without input take `null`.
impl Schema for () {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(())
        } else {
            v.report(Reason::WrongType { expected: "null", found: kind(value) });
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
