use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

use crate::Error;

const CORS_ALLOWED_METHODS: &str = "OPTIONS,POST,GET,PUT,DELETE";

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOWED_METHODS),
    );
    headers
}

pub(crate) fn raw(status: StatusCode, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code: i64::from(status.as_u16()),
        headers: default_headers(),
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}

pub(crate) fn json<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
) -> Result<ApiGatewayProxyResponse, Error> {
    Ok(raw(status, serde_json::to_string(body)?))
}

pub(crate) fn message(status: StatusCode, message: &str) -> ApiGatewayProxyResponse {
    raw(status, serde_json::json!({ "message": message }).to_string())
}

pub(crate) fn with_header(
    mut response: ApiGatewayProxyResponse,
    name: HeaderName,
    value: &'static str,
) -> ApiGatewayProxyResponse {
    response
        .headers
        .insert(name, HeaderValue::from_static(value));
    response
}
