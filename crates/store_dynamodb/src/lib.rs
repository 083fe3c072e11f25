use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::{DeleteItemError, DeleteItemOutput};
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
use aws_sdk_dynamodb::operation::update_item::{UpdateItemError, UpdateItemOutput};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use lambda_runtime::tracing;
use model::env::{DEFAULT_TABLE_NAME, STUDENT_CONSISTENT_READ, STUDENT_TABLE_NAME};
use model::{StudentRecord, StudentUpdate, STUDENT_ID};
use std::collections::HashMap;
use store::StoreErrorReason::{BackendFailure, BadRecord, MissingEntry};
use store::StoreOperation::{DeleteStudent, GetStudent, PutStudent, UpdateStudent};
use store::{StoreError, StoreOperation, StudentStore};

mod update_expression;

use update_expression::UpdateExpression;

type Item = HashMap<String, AttributeValue>;

pub struct DynamoDbStudentStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbStudentStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        DynamoDbStudentStore {
            table_name: table_name.into(),
            dynamodb_client,
            consistent_read: false,
        }
    }

    /// Create a store using the table name and read consistency from the environment.
    pub fn from_env(dynamodb_client: aws_sdk_dynamodb::Client) -> Self {
        let table_name: String =
            std::env::var(STUDENT_TABLE_NAME).unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
        let consistent_read: bool = std::env::var(STUDENT_CONSISTENT_READ)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        tracing::info!(
            table_name = table_name.as_str(),
            consistent_read,
            "Configured DynamoDB student store"
        );

        DynamoDbStudentStore::new(dynamodb_client, table_name).with_consistent_read(consistent_read)
    }

    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl StudentStore for DynamoDbStudentStore {
    async fn put_student(&self, record: StudentRecord) -> Result<(), StoreError> {
        let item: Item = serde_dynamo::to_item(&record).map_err(|err| {
            StoreError::new(record.student_id.clone(), PutStudent, BadRecord(err.to_string()))
        })?;

        self.put_item(item).await.map_err(|err| {
            StoreError::new(record.student_id.clone(), PutStudent, BackendFailure(err.into()))
        })?;

        Ok(())
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        let output: GetItemOutput = self.get_item(student_id).await.map_err(|err| {
            StoreError::new(student_id.to_string(), GetStudent, BackendFailure(err.into()))
        })?;

        output
            .item
            .map(|item| decode(student_id, GetStudent, item))
            .transpose()
    }

    async fn update_student(
        &self,
        student_id: &str,
        update: StudentUpdate,
    ) -> Result<StudentRecord, StoreError> {
        let output: UpdateItemOutput = self
            .update_item(student_id, &update)
            .await
            .map_err(|err| {
                // The condition only fails when there is no record to update
                let missing: bool = err
                    .as_service_error()
                    .map(|service_err| service_err.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                let reason = if missing {
                    MissingEntry
                } else {
                    BackendFailure(err.into())
                };

                StoreError::new(student_id.to_string(), UpdateStudent, reason)
            })?;

        let item: Item = output.attributes.ok_or_else(|| {
            StoreError::new(
                student_id.to_string(),
                UpdateStudent,
                BadRecord("update returned no attributes".to_string()),
            )
        })?;

        decode(student_id, UpdateStudent, item)
    }

    async fn delete_student(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentRecord>, StoreError> {
        let output: DeleteItemOutput = self.delete_item(student_id).await.map_err(|err| {
            StoreError::new(student_id.to_string(), DeleteStudent, BackendFailure(err.into()))
        })?;

        output
            .attributes
            .map(|item| decode(student_id, DeleteStudent, item))
            .transpose()
    }
}

impl DynamoDbStudentStore {
    async fn get_item(
        &self,
        student_id: &str,
    ) -> Result<GetItemOutput, SdkError<GetItemError, HttpResponse>> {
        tracing::debug!(student_id, "GetItem");

        self.dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .consistent_read(self.consistent_read)
            .set_key(Some(key(student_id)))
            .send()
            .await
    }

    async fn put_item(
        &self,
        item: Item,
    ) -> Result<PutItemOutput, SdkError<PutItemError, HttpResponse>> {
        tracing::debug!("PutItem");

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
    }

    async fn update_item(
        &self,
        student_id: &str,
        update: &StudentUpdate,
    ) -> Result<UpdateItemOutput, SdkError<UpdateItemError, HttpResponse>> {
        let expression: UpdateExpression = UpdateExpression::from_update(update);

        tracing::debug!(
            student_id,
            expression = expression.update_expression.as_str(),
            "UpdateItem"
        );

        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key(student_id)))
            .update_expression(expression.update_expression)
            .condition_expression(expression.condition_expression)
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(Some(expression.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
    }

    async fn delete_item(
        &self,
        student_id: &str,
    ) -> Result<DeleteItemOutput, SdkError<DeleteItemError, HttpResponse>> {
        tracing::debug!(student_id, "DeleteItem");

        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key(student_id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
    }
}

fn key(student_id: &str) -> Item {
    HashMap::from([(
        STUDENT_ID.to_string(),
        AttributeValue::S(student_id.to_string()),
    )])
}

fn decode(
    student_id: &str,
    operation: StoreOperation,
    item: Item,
) -> Result<StudentRecord, StoreError> {
    serde_dynamo::from_item(item).map_err(|err| {
        StoreError::new(student_id.to_string(), operation, BadRecord(err.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::operation::delete_item::DeleteItemInput;
    use aws_sdk_dynamodb::operation::update_item::UpdateItemInput;
    use aws_smithy_mocks::{mock, mock_client};
    use test_utils::{
        create_failing_dynamodb_client, create_mock_dynamodb_client, student_item, TEST_TABLE,
    };

    fn store(client: aws_sdk_dynamodb::Client) -> DynamoDbStudentStore {
        DynamoDbStudentStore::new(client, TEST_TABLE)
    }

    #[tokio::test]
    async fn get_decodes_item() {
        let record: StudentRecord = StudentRecord::new("s1", "Ann", "CS");
        let store = store(create_mock_dynamodb_client(Some(student_item(&record))));

        let found: Option<StudentRecord> =
            store.get_student("s1").await.expect("Get should succeed");

        assert_eq!(Some(record), found);
    }

    #[tokio::test]
    async fn get_missing_item_is_none() {
        let store = store(create_mock_dynamodb_client(None));

        let found: Option<StudentRecord> =
            store.get_student("s1").await.expect("Get should succeed");

        assert_eq!(None, found);
    }

    #[tokio::test]
    async fn get_malformed_item_is_bad_record() {
        let item: Item = HashMap::from([
            (STUDENT_ID.to_string(), AttributeValue::S("s1".to_string())),
            ("name".to_string(), AttributeValue::N("42".to_string())),
        ]);
        let store = store(create_mock_dynamodb_client(Some(item)));

        let err: StoreError = store.get_student("s1").await.expect_err("Get should fail");

        assert!(matches!(err.reason, BadRecord(_)));
    }

    #[tokio::test]
    async fn put_failure_is_backend_failure() {
        let store = store(create_failing_dynamodb_client());

        let err: StoreError = store
            .put_student(StudentRecord::new("s1", "Ann", "CS"))
            .await
            .expect_err("Put should fail");

        assert_eq!(PutStudent, err.operation);
        assert!(matches!(err.reason, BackendFailure(_)));
    }

    #[tokio::test]
    async fn update_sends_only_supplied_fields() {
        let updated: StudentRecord = StudentRecord::new("s1", "Ann", "Math");
        let attributes: Item = student_item(&updated);

        let update_rule = mock!(aws_sdk_dynamodb::Client::update_item)
            .match_requests(|input: &UpdateItemInput| {
                input.table_name() == Some(TEST_TABLE)
                    && input.update_expression() == Some("SET #course = :course")
                    && input.condition_expression() == Some("attribute_exists(#student_id)")
                    && input.return_values() == Some(&ReturnValue::AllNew)
            })
            .then_output(move || {
                UpdateItemOutput::builder()
                    .set_attributes(Some(attributes.clone()))
                    .build()
            });
        let store = store(mock_client!(aws_sdk_dynamodb, [&update_rule]));

        let record: StudentRecord = store
            .update_student(
                "s1",
                StudentUpdate {
                    name: None,
                    course: Some("Math".to_string()),
                },
            )
            .await
            .expect("Update should succeed");

        assert_eq!(updated, record);
    }

    #[tokio::test]
    async fn update_condition_failure_is_missing_entry() {
        let update_rule = mock!(aws_sdk_dynamodb::Client::update_item).then_error(|| {
            UpdateItemError::ConditionalCheckFailedException(
                aws_sdk_dynamodb::types::error::ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            )
        });
        let store = store(mock_client!(aws_sdk_dynamodb, [&update_rule]));

        let err: StoreError = store
            .update_student(
                "s1",
                StudentUpdate {
                    name: Some("Ann".to_string()),
                    course: None,
                },
            )
            .await
            .expect_err("Update should fail");

        assert!(err.is_missing_entry());
    }

    #[tokio::test]
    async fn delete_returns_old_attributes() {
        let record: StudentRecord = StudentRecord::new("s1", "Ann", "CS");
        let attributes: Item = student_item(&record);

        let delete_rule = mock!(aws_sdk_dynamodb::Client::delete_item)
            .match_requests(|input: &DeleteItemInput| {
                input.return_values() == Some(&ReturnValue::AllOld)
            })
            .then_output(move || {
                DeleteItemOutput::builder()
                    .set_attributes(Some(attributes.clone()))
                    .build()
            });
        let store = store(mock_client!(aws_sdk_dynamodb, [&delete_rule]));

        let deleted: Option<StudentRecord> =
            store.delete_student("s1").await.expect("Delete should succeed");

        assert_eq!(Some(record), deleted);
    }

    #[tokio::test]
    async fn delete_without_attributes_is_none() {
        let delete_rule = mock!(aws_sdk_dynamodb::Client::delete_item)
            .then_output(|| DeleteItemOutput::builder().build());
        let store = store(mock_client!(aws_sdk_dynamodb, [&delete_rule]));

        let deleted: Option<StudentRecord> =
            store.delete_student("s1").await.expect("Delete should succeed");

        assert_eq!(None, deleted);
    }

    #[tokio::test]
    async fn delete_partial_item_succeeds() {
        let attributes: Item = HashMap::from([
            (STUDENT_ID.to_string(), AttributeValue::S("s1".to_string())),
            ("name".to_string(), AttributeValue::S("Ann".to_string())),
        ]);

        let delete_rule = mock!(aws_sdk_dynamodb::Client::delete_item).then_output(move || {
            DeleteItemOutput::builder()
                .set_attributes(Some(attributes.clone()))
                .build()
        });
        let store = store(mock_client!(aws_sdk_dynamodb, [&delete_rule]));

        let deleted: Option<StudentRecord> =
            store.delete_student("s1").await.expect("Delete should succeed");

        assert_eq!(Some(StudentRecord::new("s1", "Ann", "")), deleted);
    }

    #[tokio::test]
    async fn update_partial_item_succeeds() {
        let attributes: Item = HashMap::from([
            (STUDENT_ID.to_string(), AttributeValue::S("s1".to_string())),
            ("course".to_string(), AttributeValue::S("Math".to_string())),
        ]);

        let update_rule = mock!(aws_sdk_dynamodb::Client::update_item).then_output(move || {
            UpdateItemOutput::builder()
                .set_attributes(Some(attributes.clone()))
                .build()
        });
        let store = store(mock_client!(aws_sdk_dynamodb, [&update_rule]));

        let record: StudentRecord = store
            .update_student(
                "s1",
                StudentUpdate {
                    name: None,
                    course: Some("Math".to_string()),
                },
            )
            .await
            .expect("Update should succeed");

        assert_eq!(StudentRecord::new("s1", "", "Math"), record);
    }
}
