use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};

/// A response whose body is the message encoded as a JSON string.
pub(crate) fn message_response(status: StatusCode, message: &str) -> ApiGatewayProxyResponse {
    json_response(status, serde_json::Value::from(message).to_string())
}

/// A response with an already encoded JSON body.
pub(crate) fn json_response(status: StatusCode, body: String) -> ApiGatewayProxyResponse {
    let mut headers: HeaderMap = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    ApiGatewayProxyResponse {
        status_code: i64::from(status.as_u16()),
        headers,
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}
