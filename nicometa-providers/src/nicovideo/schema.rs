//! Structural validation of upstream payloads
//!
//! serde stops at the first mismatch, which makes schema drift painful to
//! diagnose. The watch payload is first checked against a declarative
//! [`Schema`] that reports every violation with its path, and only a payload
//! with zero issues is deserialized into [`WatchResponse`].

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::WatchResponse;

/// Path of the document root in issue reports
pub const ROOT_PATH: &str = "$";

/// One structural nonconformance between a JSON value and its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path with bracketed indices, e.g. `data.tag.items[2].name`
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Expected shape of a JSON value.
///
/// Object keys not listed in the schema are ignored.
#[derive(Debug, Clone)]
pub enum Schema {
    String,
    /// A JSON number with an integral value that fits in `i64`
    Integer,
    Array(Box<Schema>),
    Object(Vec<(&'static str, Schema)>),
    /// `null` is accepted in place of the inner schema
    Nullable(Box<Schema>),
    /// The key may be missing from its parent object
    Optional(Box<Schema>),
}

impl Schema {
    pub fn object(fields: impl IntoIterator<Item = (&'static str, Schema)>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array(Box::new(items))
    }

    #[must_use]
    pub fn nullable(inner: Schema) -> Self {
        Self::Nullable(Box::new(inner))
    }

    #[must_use]
    pub fn optional(inner: Schema) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Validate `value`, returning all issues in schema order
    #[must_use]
    pub fn validate(&self, value: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check(Some(value), ROOT_PATH, &mut issues);
        issues
    }

    fn check(&self, value: Option<&Value>, path: &str, issues: &mut Vec<ValidationIssue>) {
        match (self, value) {
            (Self::Optional(_), None) | (Self::Nullable(_), Some(Value::Null)) => {}
            (Self::Optional(inner) | Self::Nullable(inner), value) => {
                inner.check(value, path, issues);
            }
            (_, None) => issues.push(ValidationIssue::new(path, "required field is missing")),
            (Self::String, Some(Value::String(_))) => {}
            (Self::Integer, Some(Value::Number(n))) => {
                if n.as_i64().is_none() {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("expected integer, found non-integral or out-of-range number {n}"),
                    ));
                }
            }
            (Self::Array(items), Some(Value::Array(values))) => {
                for (i, item) in values.iter().enumerate() {
                    items.check(Some(item), &format!("{path}[{i}]"), issues);
                }
            }
            (Self::Object(fields), Some(Value::Object(map))) => {
                for (name, field) in fields {
                    field.check(map.get(*name), &child_path(path, name), issues);
                }
            }
            (expected, Some(found)) => issues.push(ValidationIssue::new(
                path,
                format!("expected {}, found {}", expected.kind(), json_kind(found)),
            )),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Nullable(inner) | Self::Optional(inner) => inner.kind(),
        }
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Expected shape of `/api/watch/v3_guest/{id}` responses
pub static WATCH_RESPONSE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object([
        ("meta", Schema::object([("status", Schema::Integer)])),
        (
            "data",
            Schema::object([
                (
                    "owner",
                    Schema::optional(Schema::nullable(Schema::object([
                        ("id", Schema::Integer),
                        ("nickname", Schema::String),
                        ("iconUrl", Schema::String),
                    ]))),
                ),
                (
                    "tag",
                    Schema::object([(
                        "items",
                        Schema::array(Schema::object([("name", Schema::String)])),
                    )]),
                ),
                (
                    "video",
                    Schema::object([
                        ("id", Schema::String),
                        ("title", Schema::String),
                        ("description", Schema::String),
                        (
                            "count",
                            Schema::object([
                                ("view", Schema::Integer),
                                ("comment", Schema::Integer),
                                ("mylist", Schema::Integer),
                                ("like", Schema::Integer),
                            ]),
                        ),
                        ("duration", Schema::Integer),
                        (
                            "thumbnail",
                            Schema::object([
                                ("url", Schema::String),
                                ("middleUrl", Schema::optional(Schema::nullable(Schema::String))),
                                ("largeUrl", Schema::optional(Schema::nullable(Schema::String))),
                                ("player", Schema::optional(Schema::nullable(Schema::String))),
                                ("ogp", Schema::String),
                            ]),
                        ),
                        ("registeredAt", Schema::String),
                    ]),
                ),
            ]),
        ),
    ])
});

/// Validate a parsed watch payload and convert it into its typed form
pub fn validate_watch_response(value: Value) -> Result<WatchResponse, Vec<ValidationIssue>> {
    let issues = WATCH_RESPONSE_SCHEMA.validate(&value);
    if !issues.is_empty() {
        return Err(issues);
    }

    // The schema mirrors WatchResponse, so this only fails if the two drift apart
    serde_json::from_value(value).map_err(|e| vec![ValidationIssue::new(ROOT_PATH, e.to_string())])
}
