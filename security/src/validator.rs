use lazy_regex::regex_is_match;
use serde_json::{Map, Value};

/// Checks applied to user supplied values before they reach storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// A user id is a positive integer.
    pub fn validate_user_id(&self, user_id: &Value) -> bool {
        tracing::debug!("Validating user ID: {user_id}");
        user_id.as_u64().is_some_and(|id| id > 0)
    }

    /// Strings must have `min_length..=max_length` characters drawn from word
    /// characters, whitespace and `-.,!?`.
    pub fn validate_string(&self, value: &Value, min_length: usize, max_length: usize) -> bool {
        tracing::debug!("Validating string: {value}");
        let Some(text) = value.as_str() else {
            return false;
        };
        let length = text.chars().count();
        (min_length..=max_length).contains(&length) && regex_is_match!(r"^[\w\s\-.,!?]+$", text)
    }

    /// Numbers, or strings holding a number, within `min_value..=max_value`.
    pub fn validate_number(&self, value: &Value, min_value: f64, max_value: f64) -> bool {
        tracing::debug!("Validating number: {value}");
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.is_some_and(|n| (min_value..=max_value).contains(&n))
    }

    /// Trims strings, keeps numbers and nulls, and turns anything else into
    /// its trimmed JSON text.
    pub fn sanitize_input(&self, data: &Map<String, Value>) -> Map<String, Value> {
        tracing::debug!("Sanitizing input: {data:?}");
        data.iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Null | Value::Number(_) => value.clone(),
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => Value::String(other.to_string().trim().to_string()),
                };
                (key.clone(), value)
            })
            .collect()
    }
}
