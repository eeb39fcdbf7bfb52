use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EMPLOYEES: &str = "employees";
pub const TRAINING_SESSIONS: &str = "trainingSessions";
pub const TRAINERS: &str = "trainers";
pub const TRAINING_TOPICS: &str = "trainingTopics";

/// Group key used for sessions that carry no usable `location`.
pub const UNKNOWN_LOCATION: &str = "Unknown";

pub const DEFAULT_SESSION_STATUS: &str = "completed";

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// A document as read from the store: its id plus loosely-typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// `{ "id": ..., ...fields }`, the shape returned by the record endpoints.
    pub fn to_json_with_id(&self) -> Value {
        let mut object = Map::with_capacity(self.data.len() + 1);
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.data {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Coerces a stored `length` value to hours.
///
/// Numbers pass through; strings are read like a leading decimal literal
/// (`"2"`, `" 2.5h"`, `"1e1"`). Anything else, or a value that does not
/// start with a number, yields `0.0`. Non-finite results also yield `0.0`.
pub fn coerce_hours(value: Option<&Value>) -> f64 {
    let hours = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_leading_float(s).unwrap_or(0.0),
        _ => 0.0,
    };

    if hours.is_finite() {
        hours
    } else {
        0.0
    }
}

/// Group key for a stored `location` value.
pub fn location_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v != 0.0) => n.to_string(),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}

fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Typed view over a stored training session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSession {
    pub id: String,
    pub date: Option<String>,
    pub hours: f64,
    pub location: String,
    pub topic: Option<String>,
    pub trainer: Option<String>,
    pub trainees: Vec<String>,
    pub status: String,
}

impl TrainingSession {
    pub fn from_document(doc: &Document) -> Self {
        let trainees = doc
            .field("trainees")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let status = doc
            .str_field("status")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_STATUS)
            .to_string();

        Self {
            id: doc.id.clone(),
            date: doc.str_field("date").map(str::to_string),
            hours: coerce_hours(doc.field("length")),
            location: location_key(doc.field("location")),
            topic: doc.str_field("topic").map(str::to_string),
            trainer: doc.str_field("trainer").map(str::to_string),
            trainees,
            status,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            topic: self.topic.clone(),
            trainer: self.trainer.clone(),
            date: self.date.clone(),
            participants: self.trainees.len(),
            status: self.status.clone(),
        }
    }
}

/// Listing shape for training sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub participants: usize,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_hours_numbers_and_strings() {
        assert_eq!(coerce_hours(Some(&json!(2))), 2.0);
        assert_eq!(coerce_hours(Some(&json!(1.5))), 1.5);
        assert_eq!(coerce_hours(Some(&json!("3"))), 3.0);
        assert_eq!(coerce_hours(Some(&json!("  2.5"))), 2.5);
        assert_eq!(coerce_hours(Some(&json!("2.5 hours"))), 2.5);
        assert_eq!(coerce_hours(Some(&json!(".5"))), 0.5);
        assert_eq!(coerce_hours(Some(&json!("1e1"))), 10.0);
        assert_eq!(coerce_hours(Some(&json!("4e"))), 4.0);
    }

    #[test]
    fn test_coerce_hours_falls_back_to_zero() {
        assert_eq!(coerce_hours(None), 0.0);
        assert_eq!(coerce_hours(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_hours(Some(&json!(""))), 0.0);
        assert_eq!(coerce_hours(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_hours(Some(&json!("."))), 0.0);
        assert_eq!(coerce_hours(Some(&json!("-"))), 0.0);
        assert_eq!(coerce_hours(Some(&json!(true))), 0.0);
        assert_eq!(coerce_hours(Some(&json!(["2"]))), 0.0);
        assert_eq!(coerce_hours(Some(&json!("1e400"))), 0.0);
    }

    #[test]
    fn test_location_key() {
        assert_eq!(location_key(Some(&json!("Room 101"))), "Room 101");
        assert_eq!(location_key(Some(&json!(""))), UNKNOWN_LOCATION);
        assert_eq!(location_key(Some(&Value::Null)), UNKNOWN_LOCATION);
        assert_eq!(location_key(None), UNKNOWN_LOCATION);
        assert_eq!(location_key(Some(&json!(0))), UNKNOWN_LOCATION);
        assert_eq!(location_key(Some(&json!(12))), "12");
    }

    #[test]
    fn test_session_from_document() {
        let data = json!({
            "topic": "JavaScript Basics",
            "trainer": "Jane Smith",
            "date": "2024-03-27",
            "trainees": ["emp-1", "emp-2", "emp-3"],
            "location": "Room 101",
            "length": "2"
        });
        let doc = Document::new("session-1", data.as_object().cloned().unwrap());
        let session = TrainingSession::from_document(&doc);

        assert_eq!(session.hours, 2.0);
        assert_eq!(session.location, "Room 101");
        assert_eq!(session.status, DEFAULT_SESSION_STATUS);

        let summary = session.summary();
        assert_eq!(summary.participants, 3);
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "id": "session-1",
                "topic": "JavaScript Basics",
                "trainer": "Jane Smith",
                "date": "2024-03-27",
                "participants": 3,
                "status": "completed"
            })
        );
    }

    #[test]
    fn test_document_json_with_id() {
        let doc = Document::new("t-1", json!({"name": "Ann"}).as_object().cloned().unwrap());
        assert_eq!(doc.to_json_with_id(), json!({"id": "t-1", "name": "Ann"}));
    }
}
