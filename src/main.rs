use aws_config::BehaviorVersion;
use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use handler::StudentHandler;
use lambda_runtime::{service_fn, tracing, LambdaEvent};
use model::Error;
use std::sync::Arc;
use store_dynamodb::DynamoDbStudentStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Created once and reused by every invocation in this process
    let dynamodb_client: aws_sdk_dynamodb::Client =
        aws_sdk_dynamodb::Client::new(&aws_config::load_defaults(BehaviorVersion::latest()).await);
    let handler: StudentHandler =
        StudentHandler::new(Arc::new(DynamoDbStudentStore::from_env(dynamodb_client)));

    lambda_runtime::run(service_fn(
        |event: LambdaEvent<ApiGatewayProxyRequest>| handler.handle_event(event),
    ))
    .await
}
