//! Request body validation
//!
//! Bodies arrive as raw JSON so that every bad field can be reported at once
//! as `{"field": ["message", ...]}`. Absent optional fields stay `None`; an
//! explicit `null` is an error rather than a silent "leave unchanged".

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use shared::{
    HazardPatch, JhaPatch, MAX_STEP_NUMBER, NewHazard, NewJha, NewStep, StepPatch,
    parse_step_number,
};

use crate::error::{WebServerError, WebServerResult};

pub const MSG_MISSING: &str = "Missing data for required field.";
pub const MSG_NULL: &str = "Field may not be null.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_EMPTY: &str = "Field may not be empty.";
pub const MSG_NOT_INTEGER: &str = "Not a valid integer.";
pub const MSG_TOO_SMALL: &str = "Must be greater than or equal to 1.";
pub const MSG_TOO_LARGE: &str = "Must be less than or equal to 2147483647.";
pub const MSG_NOT_OBJECT: &str = "Invalid input type.";

/// Field name to messages, rendered as the body of a 400
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Walks one JSON object, collecting errors as fields are read
struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    fn of(body: &'a Value) -> WebServerResult<Self> {
        match body.as_object() {
            Some(object) => Ok(Self { object, errors: FieldErrors::default() }),
            None => Err(WebServerError::Validation(FieldErrors::single("_schema", MSG_NOT_OBJECT))),
        }
    }

    fn required_str(&mut self, name: &str) -> Option<String> {
        match self.object.get(name) {
            None => {
                self.errors.add(name, MSG_MISSING);
                None
            }
            Some(value) => self.text(name, value),
        }
    }

    fn optional_str(&mut self, name: &str) -> Option<String> {
        let value = self.object.get(name)?;
        self.text(name, value)
    }

    fn text(&mut self, name: &str, value: &Value) -> Option<String> {
        match value {
            Value::Null => {
                self.errors.add(name, MSG_NULL);
                None
            }
            Value::String(text) if text.trim().is_empty() => {
                self.errors.add(name, MSG_EMPTY);
                None
            }
            Value::String(text) => Some(text.clone()),
            _ => {
                self.errors.add(name, MSG_NOT_STRING);
                None
            }
        }
    }

    fn optional_step_number(&mut self, name: &str) -> Option<u32> {
        let value = self.object.get(name)?;
        if value.is_null() {
            self.errors.add(name, MSG_NULL);
            return None;
        }
        let Some(number) = integral(value) else {
            self.errors.add(name, MSG_NOT_INTEGER);
            return None;
        };
        match parse_step_number(number) {
            Ok(number) => Some(number),
            Err(_) => {
                self.errors.add(name, step_number_message(number));
                None
            }
        }
    }

    fn finish(self) -> WebServerResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WebServerError::Validation(self.errors))
        }
    }
}

/// A JSON number with no fractional part, so `3` and `3.0` both read as 3.
/// Out-of-range floats saturate and are then caught by the range check.
fn integral(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|float| float.is_finite() && float.fract() == 0.0)
            .map(|float| float as i64)
    })
}

/// Message for a step number outside `1..=MAX_STEP_NUMBER`.
pub fn step_number_message(value: i64) -> &'static str {
    if value > i64::from(MAX_STEP_NUMBER) {
        MSG_TOO_LARGE
    } else {
        MSG_TOO_SMALL
    }
}

pub fn new_jha(body: &Value) -> WebServerResult<NewJha> {
    let mut fields = Fields::of(body)?;
    let title = fields.required_str("title");
    let author = fields.required_str("author");
    let job_description = fields.required_str("job_description");
    let job_location = fields.required_str("job_location");

    fields.finish()?;

    // Every `None` above recorded an error, so past `finish` all are present.
    Ok(NewJha {
        title: title.unwrap_or_default(),
        author: author.unwrap_or_default(),
        job_description: job_description.unwrap_or_default(),
        job_location: job_location.unwrap_or_default(),
    })
}

pub fn jha_patch(body: &Value) -> WebServerResult<JhaPatch> {
    let mut fields = Fields::of(body)?;
    let patch = JhaPatch {
        title: fields.optional_str("title"),
        author: fields.optional_str("author"),
        job_description: fields.optional_str("job_description"),
        job_location: fields.optional_str("job_location"),
    };
    fields.finish()?;
    Ok(patch)
}

/// `step_number` is assigned on append; a supplied value is ignored.
pub fn new_step(body: &Value) -> WebServerResult<NewStep> {
    let mut fields = Fields::of(body)?;
    let step_description = fields.required_str("step_description");
    fields.finish()?;
    Ok(NewStep { step_description: step_description.unwrap_or_default() })
}

pub fn step_patch(body: &Value) -> WebServerResult<StepPatch> {
    let mut fields = Fields::of(body)?;
    let patch = StepPatch {
        step_number: fields.optional_step_number("step_number"),
        step_description: fields.optional_str("step_description"),
    };
    fields.finish()?;
    Ok(patch)
}

pub fn new_hazard(body: &Value) -> WebServerResult<NewHazard> {
    let mut fields = Fields::of(body)?;
    let description = fields.required_str("description");
    let controls = fields.required_str("controls");
    fields.finish()?;
    Ok(NewHazard {
        description: description.unwrap_or_default(),
        controls: controls.unwrap_or_default(),
    })
}

pub fn hazard_patch(body: &Value) -> WebServerResult<HazardPatch> {
    let mut fields = Fields::of(body)?;
    let patch = HazardPatch {
        description: fields.optional_str("description"),
        controls: fields.optional_str("controls"),
    };
    fields.finish()?;
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(result: WebServerResult<impl fmt::Debug>) -> FieldErrors {
        match result {
            Err(WebServerError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_jha_accepts_complete_body() {
        let body = json!({
            "title": "Scaffold erection",
            "author": "P. Novak",
            "job_description": "Erect a 3-lift scaffold",
            "job_location": "East facade",
            "created_at": "2001-01-01T00:00:00Z"
        });

        let jha = new_jha(&body).unwrap();

        assert_eq!(jha.title, "Scaffold erection");
        assert_eq!(jha.job_location, "East facade");
    }

    #[test]
    fn test_new_jha_reports_every_bad_field() {
        let body = json!({ "title": "", "author": 12, "job_location": null });

        let errors = field_errors(new_jha(&body));

        assert_eq!(errors.messages("title"), [MSG_EMPTY]);
        assert_eq!(errors.messages("author"), [MSG_NOT_STRING]);
        assert_eq!(errors.messages("job_description"), [MSG_MISSING]);
        assert_eq!(errors.messages("job_location"), [MSG_NULL]);
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let errors = field_errors(new_hazard(&json!(["description"])));
        assert_eq!(errors.messages("_schema"), [MSG_NOT_OBJECT]);
    }

    #[test]
    fn test_patch_keeps_absent_fields_as_none() {
        let patch = jha_patch(&json!({ "author": "P. Novak" })).unwrap();

        assert_eq!(patch.author.as_deref(), Some("P. Novak"));
        assert!(patch.title.is_none());
        assert!(patch.job_description.is_none());
        assert!(patch.job_location.is_none());
    }

    #[test]
    fn test_patch_rejects_explicit_null() {
        let errors = field_errors(hazard_patch(&json!({ "controls": null })));
        assert_eq!(errors.messages("controls"), [MSG_NULL]);
    }

    #[test]
    fn test_step_patch_number_rules() {
        assert_eq!(step_patch(&json!({ "step_number": 3 })).unwrap().step_number, Some(3));
        assert_eq!(
            field_errors(step_patch(&json!({ "step_number": 0 }))).messages("step_number"),
            [MSG_TOO_SMALL]
        );
        assert_eq!(
            field_errors(step_patch(&json!({ "step_number": "2" }))).messages("step_number"),
            [MSG_NOT_INTEGER]
        );
        assert_eq!(
            field_errors(step_patch(&json!({ "step_number": 1.5 }))).messages("step_number"),
            [MSG_NOT_INTEGER]
        );
    }

    #[test]
    fn test_step_number_accepts_integral_floats() {
        assert_eq!(step_patch(&json!({ "step_number": 3.0 })).unwrap().step_number, Some(3));
        assert_eq!(
            field_errors(step_patch(&json!({ "step_number": 0.0 }))).messages("step_number"),
            [MSG_TOO_SMALL]
        );
    }

    #[test]
    fn test_step_number_above_cap_is_too_large() {
        let max = i64::from(MAX_STEP_NUMBER);
        assert_eq!(step_patch(&json!({ "step_number": max })).unwrap().step_number, Some(MAX_STEP_NUMBER));

        for too_large in [json!(max + 1), json!(u64::MAX), json!(1e20)] {
            assert_eq!(
                field_errors(step_patch(&json!({ "step_number": too_large }))).messages("step_number"),
                [MSG_TOO_LARGE],
                "value {too_large}"
            );
        }
        assert_eq!(MSG_TOO_LARGE, format!("Must be less than or equal to {MAX_STEP_NUMBER}."));
    }

    #[test]
    fn test_new_step_ignores_client_number() {
        let step = new_step(&json!({ "step_description": "Tie off", "step_number": 9 })).unwrap();
        assert_eq!(step.step_description, "Tie off");
    }
}
