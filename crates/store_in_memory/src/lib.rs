use async_trait::async_trait;
use model::{StudentRecord, StudentUpdate};
use store::StoreErrorReason::{BackendFailure, MissingEntry};
use store::StoreOperation::{DeleteStudent, GetStudent, PutStudent, UpdateStudent};
use store::{StoreError, StoreOperation, StudentStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A store holding records in process memory, for use in testing.
#[derive(Clone, Default)]
pub struct InMemoryStudentStore {
    students: Arc<Mutex<HashMap<String, StudentRecord>>>,
}

impl InMemoryStudentStore {
    pub fn len(&self) -> usize {
        self.students
            .lock()
            .expect("Student store lock should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn students(
        &self,
        student_id: &str,
        operation: StoreOperation,
    ) -> Result<MutexGuard<'_, HashMap<String, StudentRecord>>, StoreError> {
        self.students.lock().map_err(|err| {
            StoreError::new(
                student_id.to_string(),
                operation,
                BackendFailure(err.to_string().into()),
            )
        })
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn put_student(&self, record: StudentRecord) -> Result<(), StoreError> {
        self.students(&record.student_id, PutStudent)?
            .insert(record.student_id.clone(), record);

        Ok(())
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.students(student_id, GetStudent)?;

        Ok(guard.get(student_id).cloned())
    }

    async fn update_student(
        &self,
        student_id: &str,
        update: StudentUpdate,
    ) -> Result<StudentRecord, StoreError> {
        let mut guard = self.students(student_id, UpdateStudent)?;
        let record: &mut StudentRecord = guard.get_mut(student_id).ok_or_else(|| {
            StoreError::new(student_id.to_string(), UpdateStudent, MissingEntry)
        })?;

        record.apply(&update);

        Ok(record.clone())
    }

    async fn delete_student(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentRecord>, StoreError> {
        Ok(self.students(student_id, DeleteStudent)?.remove(student_id))
    }
}
