//! JSON:API test server for exercising `api-caller` over real HTTP.
//!
//! Routes:
//! - `/echo` (any method): a single `echo` resource describing the request,
//!   with two `X-Echo` response headers.
//! - `POST /upload`: one `part` resource per multipart field.
//! - `GET /missing`: 404 with a JSON:API error document.
//! - `GET /broken`: 500 with a plain-text body.
//! - `GET /empty`: 200 with no body.
//! - `GET /large`: 200 with an 11 MiB plain-text body.
//! - `GET /redirect`: 302 pointing at `/echo`.

use axum::{
    extract::Multipart,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/upload", post(upload))
        .route("/missing", get(missing))
        .route("/broken", get(broken))
        .route("/empty", get(empty))
        .route("/large", get(large))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Request headers as `name -> [values]`, in arrival order.
fn header_values(headers: &HeaderMap) -> Map<String, Value> {
    let mut values = Map::new();
    for (name, value) in headers {
        let entry = values
            .entry(name.as_str().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(Value::from(String::from_utf8_lossy(value.as_bytes()).into_owned()));
        }
    }
    values
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    tracing::debug!(%method, %uri, "echo");
    let document = json!({
        "data": {
            "type": "echo",
            "id": "1",
            "attributes": {
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query().unwrap_or_default(),
                "headers": header_values(&headers),
                "body": body,
            }
        }
    });
    let mut response = Json(document).into_response();
    let response_headers = response.headers_mut();
    response_headers.append("x-echo", HeaderValue::from_static("one"));
    response_headers.append("x-echo", HeaderValue::from_static("two"));
    response
}

async fn upload(mut multipart: Multipart) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(json!({
            "type": "part",
            "id": name,
            "attributes": {
                "fileName": file_name,
                "contentType": content_type,
                "content": String::from_utf8_lossy(&bytes),
            }
        }));
    }
    Ok((StatusCode::CREATED, Json(json!({ "data": parts }))))
}

async fn missing() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"errors": [{"status": "404", "title": "Not Found"}]})),
    )
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "oops")
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

/// Size of the `/large` body, above ureq's default read limit.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

async fn large() -> String {
    "x".repeat(LARGE_BODY_LEN)
}

async fn redirect() -> (StatusCode, [(header::HeaderName, &'static str); 1]) {
    (StatusCode::FOUND, [(header::LOCATION, "/echo")])
}
