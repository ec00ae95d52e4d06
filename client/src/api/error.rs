use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Status used when no HTTP response exists.
pub const NO_STATUS: u16 = 0;
pub const NOT_FOUND: u16 = 404;

/// The single error shape every failed request is reduced to.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// How a request failed, before normalization.
#[derive(Debug, Clone, Copy)]
pub enum Failure<'a> {
    /// The server answered with a non-success status.
    Response { status: u16, body: &'a [u8] },
    /// The request went out but nothing usable came back.
    NoResponse,
    /// The request was never sent.
    NotSent(Option<&'a str>),
}

impl ApiError {
    pub fn classify(failure: Failure<'_>) -> Self {
        match failure {
            Failure::Response { status, body } => Self::from_response(status, body),
            Failure::NoResponse => Self::network(),
            Failure::NotSent(message) => Self::not_sent(message.unwrap_or_default()),
        }
    }

    /// Non-JSON bodies are taken as plain text, like a string payload.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let data = serde_json::from_slice::<Value>(body).unwrap_or_else(|_| {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        });
        Self::from_body(status, &data)
    }

    pub fn from_body(status: u16, data: &Value) -> Self {
        let (message, errors) = match data {
            Value::String(text) if !text.is_empty() => (text.clone(), None),
            Value::Object(map) => message_from_object(map),
            _ => (GENERIC_ERROR_MESSAGE.to_string(), None),
        };
        Self {
            message,
            status,
            errors,
        }
    }

    pub fn network() -> Self {
        Self {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            status: NO_STATUS,
            errors: None,
        }
    }

    pub fn not_sent(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            status: NO_STATUS,
            errors: None,
        }
    }

    /// A success status whose body could not be decoded into the expected type.
    pub fn decode(status: u16, err: &serde_json::Error) -> Self {
        Self {
            message: format!("Failed to parse response: {}", err),
            status,
            errors: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == NOT_FOUND
    }

    pub fn should_notify(&self) -> bool {
        !self.is_not_found()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.errors.as_ref().and_then(|errors| errors.get(name))
    }
}

impl From<ApiError> for String {
    fn from(error: ApiError) -> Self {
        error.message
    }
}

fn message_from_object(map: &Map<String, Value>) -> (String, Option<FieldErrors>) {
    for key in ["detail", "message", "error"] {
        if let Some(value) = map.get(key).filter(|value| is_truthy(value)) {
            return (text_of(value), None);
        }
    }

    if let Some(value) = map.get("non_field_errors").filter(|value| is_truthy(value)) {
        let first = match value {
            Value::Array(items) => items.first().filter(|item| is_truthy(item)).map(text_of),
            Value::String(text) => Some(text.clone()),
            _ => None,
        };
        return (
            first.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            None,
        );
    }

    // Catch-all: assume a field-validation map and surface the first entry in
    // insertion order. With several invalid fields, which one wins depends on
    // the backend's serialization order.
    let message = match map.values().next() {
        Some(Value::Array(items)) if !items.is_empty() => text_of(&items[0]),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    };
    (message, Some(FieldErrors::from_map(map)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Field name to messages, in the order the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .map(|(field, value)| {
                    let messages = match value {
                        Value::Array(items) => items.iter().map(text_of).collect(),
                        other => vec![text_of(other)],
                    };
                    (field.clone(), messages)
                })
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, messages) in &self.0 {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldErrorsVisitor;

        impl<'de> Visitor<'de> for FieldErrorsVisitor {
            type Value = FieldErrors;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to message lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldErrors, A::Error> {
                let mut entries = Vec::new();
                while let Some((field, messages)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((field, messages));
                }
                Ok(FieldErrors(entries))
            }
        }

        deserializer.deserialize_map(FieldErrorsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(status: u16, body: Value) -> ApiError {
        ApiError::from_response(status, body.to_string().as_bytes())
    }

    #[test]
    fn detail_wins_and_carries_no_field_errors() {
        let error = normalize(400, json!({"detail": "Invalid credentials"}));
        assert_eq!(error.message, "Invalid credentials");
        assert_eq!(error.status, 400);
        assert!(error.errors.is_none());
    }

    #[test]
    fn field_validation_map_is_preserved() {
        let error = normalize(400, json!({"phone_number": ["This field is required."]}));
        assert_eq!(error.message, "This field is required.");
        assert_eq!(
            error.field("phone_number"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn precedence_follows_detail_message_error_non_field_errors() {
        let error = normalize(
            400,
            json!({"error": "e", "message": "m", "detail": "d", "non_field_errors": ["n"]}),
        );
        assert_eq!(error.message, "d");

        let error = normalize(400, json!({"error": "e", "message": "m"}));
        assert_eq!(error.message, "m");

        let error = normalize(500, json!({"error": "e", "non_field_errors": ["n"]}));
        assert_eq!(error.message, "e");

        let error = normalize(400, json!({"non_field_errors": ["Passwords do not match."]}));
        assert_eq!(error.message, "Passwords do not match.");
        assert!(error.errors.is_none());
    }

    #[test]
    fn empty_detail_falls_through_to_next_key() {
        let error = normalize(400, json!({"detail": "", "message": "fallback"}));
        assert_eq!(error.message, "fallback");
    }

    #[test]
    fn empty_non_field_errors_uses_generic_message() {
        let error = normalize(400, json!({"non_field_errors": []}));
        assert_eq!(error.message, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn first_field_in_insertion_order_supplies_message() {
        let error = normalize(
            400,
            json!({"slug": ["Slug taken."], "name": ["Name required."]}),
        );
        assert_eq!(error.message, "Slug taken.");
        let errors = error.errors.expect("field errors");
        let fields: Vec<&str> = errors.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["slug", "name"]);
    }

    #[test]
    fn first_field_without_array_uses_generic_message_but_keeps_map() {
        let error = normalize(400, json!({"price": "Must be positive."}));
        assert_eq!(error.message, GENERIC_ERROR_MESSAGE);
        assert_eq!(
            error.field("price"),
            Some(&["Must be positive.".to_string()][..])
        );
    }

    #[test]
    fn plain_text_body_is_used_verbatim() {
        let error = ApiError::from_response(502, b"Bad Gateway");
        assert_eq!(error.message, "Bad Gateway");
        assert_eq!(error.status, 502);

        let error = normalize(500, json!("Server exploded"));
        assert_eq!(error.message, "Server exploded");
    }

    #[test]
    fn empty_or_scalar_bodies_use_generic_message() {
        assert_eq!(ApiError::from_response(500, b"").message, GENERIC_ERROR_MESSAGE);
        assert_eq!(ApiError::from_response(500, b"  \n").message, GENERIC_ERROR_MESSAGE);
        assert_eq!(normalize(500, json!(null)).message, GENERIC_ERROR_MESSAGE);
        assert_eq!(normalize(500, json!(42)).message, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn non_string_detail_is_rendered_as_json() {
        let error = normalize(403, json!({"detail": {"code": "token_not_valid"}}));
        assert_eq!(error.message, r#"{"code":"token_not_valid"}"#);
    }

    #[test]
    fn transport_failures_use_status_zero() {
        let network = ApiError::classify(Failure::NoResponse);
        assert_eq!(network.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(network.status, 0);
        assert!(network.errors.is_none());

        let not_sent = ApiError::classify(Failure::NotSent(Some("relative URL without a base")));
        assert_eq!(not_sent.message, "relative URL without a base");
        assert_eq!(not_sent.status, 0);

        let unknown = ApiError::classify(Failure::NotSent(None));
        assert_eq!(unknown.message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn only_not_found_is_silent() {
        assert!(!normalize(404, json!({"detail": "Not found."})).should_notify());
        for status in [400, 401, 403, 409, 500] {
            assert!(normalize(status, json!({})).should_notify(), "{}", status);
        }
        assert!(ApiError::network().should_notify());
    }

    #[test]
    fn display_and_string_conversion_match_message() {
        let error = normalize(400, json!({"detail": "boom"}));
        assert_eq!(format!("{}", error), "boom");
        let raw: String = error.into();
        assert_eq!(raw, "boom");
    }

    #[test]
    fn serializes_field_errors_as_ordered_map() {
        let error = normalize(400, json!({"b": ["x"], "a": ["y"]}));
        let encoded = serde_json::to_string(&error).expect("serialize");
        assert_eq!(
            encoded,
            r#"{"message":"x","status":400,"errors":{"b":["x"],"a":["y"]}}"#
        );
        let decoded: ApiError = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, error);
    }
}
