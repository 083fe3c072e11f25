use async_trait::async_trait;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::error::InternalServerError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_smithy_mocks::{mock, mock_client, Rule};
use http::Method;
use model::{StudentRecord, StudentUpdate, COURSE, NAME, STUDENT_ID};
use query_map::QueryMap;
use std::collections::HashMap;
use store::{StoreError, StoreErrorReason, StoreOperation, StudentStore};

/// Test table name
pub const TEST_TABLE: &str = "students_table";

/// Create an API Gateway request with the given query parameters and body
pub fn api_request(
    method: Method,
    query: &[(&str, &str)],
    body: Option<&str>,
) -> ApiGatewayProxyRequest {
    let query: HashMap<String, Vec<String>> = query
        .iter()
        .map(|&(k, v)| (k.to_string(), vec![v.to_string()]))
        .collect();

    ApiGatewayProxyRequest {
        http_method: method,
        query_string_parameters: QueryMap::from(query),
        body: body.map(str::to_string),
        ..Default::default()
    }
}

/// Parse the JSON body of a response
pub fn response_json(response: &ApiGatewayProxyResponse) -> serde_json::Value {
    match &response.body {
        Some(Body::Text(text)) => {
            serde_json::from_str(text).expect("Response body should be valid JSON")
        }
        other => panic!("Expected a text body, got {:?}", other),
    }
}

/// The DynamoDB item for a record
pub fn student_item(record: &StudentRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            STUDENT_ID.to_string(),
            AttributeValue::S(record.student_id.clone()),
        ),
        (NAME.to_string(), AttributeValue::S(record.name.clone())),
        (COURSE.to_string(), AttributeValue::S(record.course.clone())),
    ])
}

/// A mock DynamoDB client whose `GetItem` returns the given item
pub fn create_mock_dynamodb_client(
    item: Option<HashMap<String, AttributeValue>>,
) -> aws_sdk_dynamodb::Client {
    let get_item_rule: Rule = mock!(aws_sdk_dynamodb::Client::get_item)
        .match_requests(|input| input.table_name() == Some(TEST_TABLE))
        .then_output(move || {
            GetItemOutput::builder()
                .set_item(item.clone())
                .build()
        });

    mock_client!(aws_sdk_dynamodb, [&get_item_rule])
}

/// A mock DynamoDB client whose `PutItem` always fails
pub fn create_failing_dynamodb_client() -> aws_sdk_dynamodb::Client {
    let put_item_rule: Rule = mock!(aws_sdk_dynamodb::Client::put_item).then_error(|| {
        PutItemError::InternalServerError(
            InternalServerError::builder()
                .message("Internal server error")
                .build(),
        )
    });

    mock_client!(aws_sdk_dynamodb, [&put_item_rule])
}

/// A store where every operation fails with a backend error.
pub struct FailingStudentStore;

impl FailingStudentStore {
    fn fail(student_id: &str, operation: StoreOperation) -> StoreError {
        StoreError::new(
            student_id.to_string(),
            operation,
            StoreErrorReason::BackendFailure("store unavailable".into()),
        )
    }
}

#[async_trait]
impl StudentStore for FailingStudentStore {
    async fn put_student(&self, record: StudentRecord) -> Result<(), StoreError> {
        Err(Self::fail(&record.student_id, StoreOperation::PutStudent))
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        Err(Self::fail(student_id, StoreOperation::GetStudent))
    }

    async fn update_student(
        &self,
        student_id: &str,
        _: StudentUpdate,
    ) -> Result<StudentRecord, StoreError> {
        Err(Self::fail(student_id, StoreOperation::UpdateStudent))
    }

    async fn delete_student(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentRecord>, StoreError> {
        Err(Self::fail(student_id, StoreOperation::DeleteStudent))
    }
}

/// A store which panics on every operation.
pub struct PanickingStudentStore;

#[async_trait]
impl StudentStore for PanickingStudentStore {
    async fn put_student(&self, _: StudentRecord) -> Result<(), StoreError> {
        panic!("put_student")
    }

    async fn get_student(&self, _: &str) -> Result<Option<StudentRecord>, StoreError> {
        panic!("get_student")
    }

    async fn update_student(
        &self,
        _: &str,
        _: StudentUpdate,
    ) -> Result<StudentRecord, StoreError> {
        panic!("update_student")
    }

    async fn delete_student(&self, _: &str) -> Result<Option<StudentRecord>, StoreError> {
        panic!("delete_student")
    }
}
