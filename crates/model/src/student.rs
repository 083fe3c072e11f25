use crate::{StudentRecord, COURSE, NAME};
use serde::Deserialize;

/// The JSON body of a create or update request.
///
/// Every field is optional at this stage so that a missing field can be
/// reported as a validation failure rather than a decoding failure.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StudentPayload {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

impl StudentPayload {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// The non-empty `student_id`, if one was supplied.
    pub fn student_id(&self) -> Option<&str> {
        non_empty(&self.student_id)
    }

    /// A complete record, or `None` if any field is missing or empty.
    pub fn into_record(self) -> Option<StudentRecord> {
        let student_id = non_empty_owned(self.student_id)?;
        let name = non_empty_owned(self.name)?;
        let course = non_empty_owned(self.course)?;

        Some(StudentRecord {
            student_id,
            name,
            course,
        })
    }

    /// The updatable fields. Empty strings count as not supplied.
    pub fn update(&self) -> StudentUpdate {
        StudentUpdate {
            name: non_empty(&self.name).map(str::to_string),
            course: non_empty(&self.course).map(str::to_string),
        }
    }
}

/// A partial update to an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub course: Option<String>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.course.is_none()
    }

    /// Attribute name and new value for each supplied field.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields: Vec<(&'static str, &str)> = Vec::with_capacity(2);

        if let Some(name) = &self.name {
            fields.push((NAME, name.as_str()));
        }
        if let Some(course) = &self.course {
            fields.push((COURSE, course.as_str()));
        }

        fields
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn non_empty_owned(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_payload_becomes_record() {
        let payload: StudentPayload =
            StudentPayload::from_json(r#"{"student_id":"s1","name":"Ann","course":"CS"}"#)
                .expect("Payload should parse");

        assert_eq!(
            Some(StudentRecord::new("s1", "Ann", "CS")),
            payload.into_record()
        );
    }

    #[test]
    fn payload_with_empty_field_is_not_a_record() {
        let payload: StudentPayload =
            StudentPayload::from_json(r#"{"student_id":"s1","name":"","course":"CS"}"#)
                .expect("Payload should parse");

        assert_eq!(None, payload.into_record());
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let payload: StudentPayload =
            StudentPayload::from_json(r#"{"student_id":null,"name":"Ann"}"#)
                .expect("Payload should parse");

        assert_eq!(None, payload.student_id());
    }

    #[test]
    fn non_string_field_fails_to_parse() {
        assert!(StudentPayload::from_json(r#"{"student_id":42}"#).is_err());
        assert!(StudentPayload::from_json(r#""s1""#).is_err());
    }

    #[test]
    fn update_ignores_empty_strings() {
        let payload: StudentPayload =
            StudentPayload::from_json(r#"{"student_id":"s1","name":"","course":"Math"}"#)
                .expect("Payload should parse");
        let update: StudentUpdate = payload.update();

        assert_eq!(None, update.name);
        assert_eq!(vec![(COURSE, "Math")], update.fields());
    }

    #[test]
    fn apply_leaves_unsupplied_fields() {
        let mut record: StudentRecord = StudentRecord::new("s1", "Ann", "CS");

        record.apply(&StudentUpdate {
            name: Some("Bob".to_string()),
            course: None,
        });

        assert_eq!(StudentRecord::new("s1", "Bob", "CS"), record);
    }
}
