//! Validation rules for the registration form
//!
//! Rules are plain data: each field lists the checks it must pass and the
//! message shown when it does not. [`validate`] applies them and keeps the
//! first failing message per field.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::{Field, FormInput};

/// Minimum number of characters in a password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Named formats a field value can be checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Email,
}

impl Pattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Pattern::Email => email_regex().is_match(value),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Dot-atom local part: atoms of letters, digits or specials joined by single dots
const EMAIL_LOCAL: &str = concat!(
    r"[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+",
    r"(?:\.[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+)*",
);

/// Hostname labels followed by a top-level domain that starts and ends
/// with a letter
const EMAIL_DOMAIN: &str = concat!(
    r"(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+",
    r"[A-Za-z](?:[A-Za-z0-9-]*[A-Za-z])?",
);

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(&format!("^{}@{}$", EMAIL_LOCAL, EMAIL_DOMAIN)).expect("email pattern is valid")
    })
}

/// Checks applied to one field, in order: required, min length, pattern,
/// equals another field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub required: Option<&'static str>,
    pub min_length: Option<(usize, &'static str)>,
    pub pattern: Option<(Pattern, &'static str)>,
    pub equals_field: Option<(Field, &'static str)>,
}

impl FieldRule {
    const fn required(field: Field, message: &'static str) -> Self {
        Self {
            field,
            required: Some(message),
            min_length: None,
            pattern: None,
            equals_field: None,
        }
    }

    /// First failing message for this field, if any
    pub fn check(&self, input: &FormInput) -> Option<&'static str> {
        let value = input.get(self.field);

        if value.is_empty() {
            // Optional and empty: nothing else to check
            return self.required;
        }

        if let Some((min, message)) = self.min_length {
            if value.chars().count() < min {
                return Some(message);
            }
        }

        if let Some((pattern, message)) = self.pattern {
            if !pattern.matches(value) {
                return Some(message);
            }
        }

        if let Some((other, message)) = self.equals_field {
            if value != input.get(other) {
                return Some(message);
            }
        }

        None
    }
}

/// The registration form's rule table
pub static REGISTRATION_RULES: [FieldRule; 7] = [
    FieldRule::required(Field::Name, "Name is required."),
    FieldRule {
        pattern: Some((Pattern::Email, "Invalid email.")),
        ..FieldRule::required(Field::Email, "Email is required.")
    },
    FieldRule {
        min_length: Some((MIN_PASSWORD_LEN, "Password must have at least 6 characters.")),
        ..FieldRule::required(Field::Password, "Password is required.")
    },
    FieldRule {
        equals_field: Some((Field::Password, "Password didn't match.")),
        ..FieldRule::required(Field::ConfirmPassword, "You need to confirm your password.")
    },
    FieldRule::required(Field::Bio, "Bio is required."),
    FieldRule::required(Field::Contact, "Contact is required."),
    FieldRule::required(Field::CourseModule, "Please select your module."),
];

/// Per-field error messages from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<Field, &'static str>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, *m))
    }

    /// Errors keyed by the field's payload key
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(field, msg)| (field.key().to_string(), serde_json::Value::from(msg)))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Apply `rules` to `input`
pub fn validate_with(input: &FormInput, rules: &[FieldRule]) -> ValidationResult {
    let mut errors = BTreeMap::new();
    for rule in rules {
        if errors.contains_key(&rule.field) {
            continue;
        }
        if let Some(message) = rule.check(input) {
            errors.insert(rule.field, message);
        }
    }
    ValidationResult { errors }
}

/// Validate against the registration rule table
pub fn validate(input: &FormInput) -> ValidationResult {
    validate_with(input, &REGISTRATION_RULES)
}
