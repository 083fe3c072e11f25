use serde::{Deserialize, Serialize};

pub mod env;
pub mod student;

pub use student::{StudentPayload, StudentUpdate};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Attribute names as stored in the table.
pub const STUDENT_ID: &str = "student_id";
pub const NAME: &str = "name";
pub const COURSE: &str = "course";

/// A persisted student record, keyed by `student_id`.
///
/// Items written by earlier versions of the function may lack `name` or
/// `course`, so those read back as empty strings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: String,
}

impl StudentRecord {
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        course: impl Into<String>,
    ) -> Self {
        StudentRecord {
            student_id: student_id.into(),
            name: name.into(),
            course: course.into(),
        }
    }

    /// Merge the supplied fields, leaving the others untouched.
    pub fn apply(&mut self, update: &StudentUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(course) = &update.course {
            self.course = course.clone();
        }
    }
}
