//! Declarative payload validation. Each entity schema carries a rule table;
//! `validate` walks it and collects every failure before the handler bails.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use store::Row;

use crate::error::FieldError;
use crate::repo::{EntitySchema, FieldKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

#[derive(Debug)]
pub enum Rule {
    Required,
    MinLen(usize),
    MaxLen(usize),
    Email,
    Phone,
    Date,
    DateTime,
    OneOf(&'static [&'static str]),
    IntRange(i64, i64),
    NonNegative,
}

pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// Validate a write payload against the schema's field kinds and rule table.
/// `Required` only applies on create; updates are partial by design.
pub fn validate(schema: &EntitySchema, row: &Row, mode: WriteMode) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for field in schema.fields {
        if let Some(value) = row.get(field.api) {
            if value.is_null() {
                continue;
            }
            if let Some(message) = kind_error(field.kind, value) {
                errors.push(FieldError::new(field.api, message));
            }
        }
    }

    for entry in schema.rules {
        match row.get(entry.field).filter(|v| !v.is_null()) {
            None => {
                let required = entry.rules.iter().any(|r| matches!(r, Rule::Required));
                if required && mode == WriteMode::Create {
                    errors.push(FieldError::new(
                        entry.field,
                        format!("{} is required", entry.field),
                    ));
                }
            }
            Some(value) => {
                for rule in entry.rules {
                    if let Some(message) = check(rule, value) {
                        errors.push(FieldError::new(entry.field, message));
                    }
                }
            }
        }
    }

    errors
}

/// Re-render accepted RFC 3339 values in UTC millisecond `Z` form. Stored
/// timestamps are compared as text, so a client-supplied offset like
/// `+09:00` would otherwise sort wrong against server-stamped values.
pub fn normalize(schema: &EntitySchema, row: &mut Row) {
    for entry in schema.rules {
        if !entry.rules.iter().any(|r| matches!(r, Rule::DateTime)) {
            continue;
        }
        let Some(Value::String(s)) = row.get(entry.field) else {
            continue;
        };
        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            let utc = parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            row.insert(entry.field.to_string(), Value::String(utc));
        }
    }
}

fn kind_error(kind: FieldKind, value: &Value) -> Option<String> {
    let ok = match kind {
        FieldKind::Text => value.is_string(),
        FieldKind::Int => value.as_i64().is_some(),
        FieldKind::Float => value.is_number(),
        FieldKind::Bool => value.is_boolean(),
    };
    if ok {
        return None;
    }
    Some(match kind {
        FieldKind::Text => "must be a string".into(),
        FieldKind::Int => "must be an integer".into(),
        FieldKind::Float => "must be a number".into(),
        FieldKind::Bool => "must be a boolean".into(),
    })
}

fn check(rule: &Rule, value: &Value) -> Option<String> {
    match rule {
        Rule::Required => None,
        Rule::MinLen(min) => {
            let s = value.as_str()?;
            (s.trim().len() < *min).then(|| format!("must be at least {min} characters"))
        }
        Rule::MaxLen(max) => {
            let s = value.as_str()?;
            (s.len() > *max).then(|| format!("must be at most {max} characters"))
        }
        Rule::Email => email_error(value.as_str()?),
        Rule::Phone => phone_error(value.as_str()?),
        Rule::Date => {
            let s = value.as_str()?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .is_err()
                .then(|| "must be a valid date (YYYY-MM-DD)".to_string())
        }
        Rule::DateTime => {
            let s = value.as_str()?;
            DateTime::parse_from_rfc3339(s)
                .is_err()
                .then(|| "must be a valid RFC 3339 timestamp".to_string())
        }
        Rule::OneOf(options) => {
            let s = value.as_str()?;
            (!options.contains(&s)).then(|| format!("must be one of: {}", options.join(", ")))
        }
        Rule::IntRange(lo, hi) => {
            let n = value.as_i64()?;
            (n < *lo || n > *hi).then(|| format!("must be between {lo} and {hi}"))
        }
        Rule::NonNegative => {
            let n = value.as_f64()?;
            (n < 0.0).then(|| "must not be negative".to_string())
        }
    }
}

pub fn email_error(s: &str) -> Option<String> {
    (!is_valid_email(s)).then(|| "must be a valid email address".to_string())
}

fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
        && !domain.contains('@')
}

pub fn phone_error(s: &str) -> Option<String> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    let ok = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    (!ok).then(|| "must be a valid phone number".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::{Direction, OrderBy};

    use crate::repo::FieldDef;

    const FIELDS: &[FieldDef] = &[
        FieldDef {
            api: "name",
            column: "name",
            kind: FieldKind::Text,
        },
        FieldDef {
            api: "email",
            column: "email",
            kind: FieldKind::Text,
        },
        FieldDef {
            api: "level",
            column: "level",
            kind: FieldKind::Int,
        },
        FieldDef {
            api: "when",
            column: "when",
            kind: FieldKind::Text,
        },
    ];
    const RULES: &[FieldRule] = &[
        FieldRule {
            field: "name",
            rules: &[Rule::Required, Rule::MaxLen(10)],
        },
        FieldRule {
            field: "email",
            rules: &[Rule::Email],
        },
        FieldRule {
            field: "level",
            rules: &[Rule::IntRange(0, 5)],
        },
        FieldRule {
            field: "when",
            rules: &[Rule::DateTime],
        },
    ];
    static SCHEMA: EntitySchema = EntitySchema {
        table: "things",
        singular: "Thing",
        plural: "Things",
        fields: FIELDS,
        rules: RULES,
        unique: &[],
        redacted: &[],
        search_columns: &[],
        order: OrderBy {
            column: "created_at",
            direction: Direction::Desc,
        },
        tenant_scoped: true,
    };

    fn row(value: serde_json::Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn required_applies_on_create_only() {
        let body = row(json!({}));
        assert_eq!(validate(&SCHEMA, &body, WriteMode::Create).len(), 1);
        assert!(validate(&SCHEMA, &body, WriteMode::Update).is_empty());
    }

    #[test]
    fn null_counts_as_absent_for_rules() {
        let body = row(json!({ "name": null }));
        let errors = validate(&SCHEMA, &body, WriteMode::Create);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "name is required");
    }

    #[test]
    fn rejects_wrong_json_kind() {
        let body = row(json!({ "name": "ok", "level": "three" }));
        let errors = validate(&SCHEMA, &body, WriteMode::Create);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "level");
        assert_eq!(errors[0].message, "must be an integer");
    }

    #[test]
    fn collects_every_failure() {
        let body = row(json!({ "name": "far too long a name", "email": "nope", "level": 9 }));
        let errors = validate(&SCHEMA, &body, WriteMode::Create);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn normalize_rewrites_offsets_to_utc() {
        let mut body = row(json!({ "when": "2026-03-01T09:00:00+09:00" }));
        normalize(&SCHEMA, &mut body);
        assert_eq!(body["when"], json!("2026-03-01T00:00:00.000Z"));
    }

    #[test]
    fn normalize_leaves_utc_and_other_fields_alone() {
        let mut body = row(json!({
            "when": "2026-03-01T00:00:00.000Z",
            "name": "x",
            "level": 2,
        }));
        let before = body.clone();
        normalize(&SCHEMA, &mut body);
        assert_eq!(body, before);
    }

    #[test]
    fn email_shapes() {
        assert!(email_error("a@b.co").is_none());
        assert!(email_error("first.last@sub.domain.org").is_none());
        assert!(email_error("missing-at.example.com").is_some());
        assert!(email_error("@example.com").is_some());
        assert!(email_error("user@nodot").is_some());
        assert!(email_error("user name@example.com").is_some());
    }

    #[test]
    fn phone_shapes() {
        assert!(phone_error("+15551234567").is_none());
        assert!(phone_error("5551234567").is_none());
        assert!(phone_error("123").is_some());
        assert!(phone_error("555-123-4567").is_some());
    }
}
