use crate::error::HandlerError;
use crate::response::{json_response, message_response};
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use futures::FutureExt;
use http::{Method, StatusCode};
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{tracing, LambdaEvent};
use model::{Error, StudentPayload, StudentRecord, StudentUpdate, STUDENT_ID};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use store::StudentStore;

pub mod error;
mod response;

const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";
const MISSING_STUDENT_ID: &str = "Missing student_id";
const MISSING_STUDENT_ID_PARAM: &str = "Missing student_id in query parameters";
const NO_FIELDS_TO_UPDATE: &str = "No fields to update";
const NOT_FOUND: &str = "Not Found";

const RECORD_ADDED: &str = "Student record added successfully";
const RECORD_UPDATED: &str = "Student record updated successfully";
const RECORD_DELETED: &str = "Student record deleted successfully";

/// Handles API Gateway proxy requests for student records.
///
/// Holds no state between invocations other than the injected store,
/// which can be shared across invocations in the same process.
///
/// | Method | Outcome |
/// |---|---|
/// | `POST` | 200 once stored, 400 unless `student_id`, `name` and `course` are all non-empty |
/// | `GET` | 200 with the record, or `{}` when there is none |
/// | `PUT` | 200 once updated, 400 without `student_id` or any non-empty field, 404 when the record doesn't exist |
/// | `DELETE` | 200 once removed, 404 when the record doesn't exist |
/// | other | 404 `"Not Found"` |
///
/// Updates never create records: a `PUT` for an unknown `student_id` is
/// answered with 404 `"Student record not found"`, the same as `DELETE`.
/// Malformed bodies are 400 and store failures 500.
///
/// ```no_compile
/// use lambda_runtime::{service_fn, LambdaEvent};
/// use aws_lambda_events::apigw::ApiGatewayProxyRequest;
///
/// let handler: StudentHandler = StudentHandler::new(Arc::new(store));
///
/// lambda_runtime::run(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| {
///     handler.handle_event(event)
/// }))
/// .await
/// ```
#[derive(Clone)]
pub struct StudentHandler {
    store: Arc<dyn StudentStore>,
}

impl StudentHandler {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        StudentHandler { store }
    }

    /// Entry point for `lambda_runtime::run()`. Never returns an error.
    pub async fn handle_event(
        &self,
        event: LambdaEvent<ApiGatewayProxyRequest>,
    ) -> Result<ApiGatewayProxyResponse, Error> {
        Ok(self.handle(event.payload).await)
    }

    /// Handle a single request, converting every failure into a response.
    pub async fn handle(&self, request: ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
        let request_span: Span = tracing::span!(
            tracing::Level::INFO,
            "Student request",
            method = request.http_method.as_str()
        );

        async {
            // Panics from the store surface as internal errors rather than failing the invocation
            let result: Result<ApiGatewayProxyResponse, HandlerError> =
                match AssertUnwindSafe(self.dispatch(request)).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(HandlerError::from_panic(panic)),
                };

            result.unwrap_or_else(|err: HandlerError| {
                err.log();
                err.into_response()
            })
        }
        .instrument(request_span)
        .await
    }

    async fn dispatch(
        &self,
        request: ApiGatewayProxyRequest,
    ) -> Result<ApiGatewayProxyResponse, HandlerError> {
        match request.http_method {
            Method::POST => self.create(parse_body(&request)?).await,
            Method::GET => self.read(query_student_id(&request)?).await,
            Method::PUT => self.update(parse_body(&request)?).await,
            Method::DELETE => self.delete(query_student_id(&request)?).await,
            ref method => {
                tracing::info!("Unsupported method {}", method);

                Ok(message_response(StatusCode::NOT_FOUND, NOT_FOUND))
            }
        }
    }

    async fn create(
        &self,
        payload: StudentPayload,
    ) -> Result<ApiGatewayProxyResponse, HandlerError> {
        let record: StudentRecord = payload
            .into_record()
            .ok_or(HandlerError::Validation(MISSING_REQUIRED_FIELDS))?;

        tracing::info!(student_id = record.student_id.as_str(), "Adding student record");

        self.store.put_student(record).await?;

        Ok(message_response(StatusCode::OK, RECORD_ADDED))
    }

    async fn read(&self, student_id: &str) -> Result<ApiGatewayProxyResponse, HandlerError> {
        tracing::info!(student_id, "Fetching student record");

        // A missing record is returned as an empty object rather than a 404
        let body: String = match self.store.get_student(student_id).await? {
            Some(record) => serde_json::to_string(&record)
                .map_err(|err| HandlerError::Internal(err.to_string()))?,
            None => serde_json::json!({}).to_string(),
        };

        Ok(json_response(StatusCode::OK, body))
    }

    async fn update(
        &self,
        payload: StudentPayload,
    ) -> Result<ApiGatewayProxyResponse, HandlerError> {
        let student_id: &str = payload
            .student_id()
            .ok_or(HandlerError::Validation(MISSING_STUDENT_ID))?;

        let update: StudentUpdate = payload.update();
        if update.is_empty() {
            return Err(HandlerError::Validation(NO_FIELDS_TO_UPDATE));
        }

        tracing::info!(student_id, "Updating student record");

        self.store.update_student(student_id, update).await?;

        Ok(message_response(StatusCode::OK, RECORD_UPDATED))
    }

    async fn delete(&self, student_id: &str) -> Result<ApiGatewayProxyResponse, HandlerError> {
        tracing::info!(student_id, "Deleting student record");

        self.store
            .delete_student(student_id)
            .await?
            .ok_or_else(|| HandlerError::NotFound(student_id.to_string()))?;

        Ok(message_response(StatusCode::OK, RECORD_DELETED))
    }
}

/// A missing body is treated the same as an empty one.
fn parse_body(request: &ApiGatewayProxyRequest) -> Result<StudentPayload, HandlerError> {
    StudentPayload::from_json(request.body.as_deref().unwrap_or_default())
        .map_err(HandlerError::Parse)
}

fn query_student_id(request: &ApiGatewayProxyRequest) -> Result<&str, HandlerError> {
    request
        .query_string_parameters
        .first(STUDENT_ID)
        .filter(|student_id| !student_id.is_empty())
        .ok_or(HandlerError::Validation(MISSING_STUDENT_ID_PARAM))
}
