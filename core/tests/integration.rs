//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ApiCaller` with the
//! default ureq transport. Validates that request building, the wire encoding
//! and response interpretation agree with a real HTTP stack.

use std::io::Write;
use std::net::SocketAddr;

use api_caller::{
    ApiCaller, ApiError, ApiRequest, CallContext, CallerConfig, FileDescriptor, FileTree,
    UreqTransport,
};
use http::StatusCode;
use serde_json::{json, Map, Value};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn caller() -> ApiCaller<UreqTransport> {
    ApiCaller::new(UreqTransport::default())
}

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn get_sends_body_as_query_and_reads_repeated_headers() {
    let server = format!("http://{}", start_server());
    let request = ApiRequest::get("/echo?x=1")
        .with_body(body(json!({"a": "1", "b": "2"})))
        .with_bearer("secret");

    let response = caller().call(&request, &server, None).unwrap();

    assert_eq!(response.http_code(), StatusCode::OK);
    assert_eq!(response.error(), "");
    let echo = response.first_resource().unwrap();
    assert_eq!(echo.attributes["method"], "GET");
    assert_eq!(echo.attributes["query"], "x=1&a=1&b=2");
    assert_eq!(echo.attributes["headers"]["authorization"], json!(["Bearer secret"]));
    assert_eq!(
        echo.attributes["headers"]["content-type"],
        json!(["application/vnd.api+json"])
    );
    assert_eq!(response.http_headers().get("x-echo"), ["one", "two"]);
}

#[test]
fn post_payload_is_sent_as_json() {
    let server = format!("http://{}/", start_server());
    let request = ApiRequest::post("echo")
        .with_payload(&json!({"data": {"type": "item", "attributes": {"n": 1}}}))
        .unwrap();

    let response = caller().call(&request, &server, None).unwrap();

    let echo = response.first_resource().unwrap();
    assert_eq!(echo.attributes["method"], "POST");
    let sent: Value = serde_json::from_str(echo.attributes["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, json!({"data": {"type": "item", "attributes": {"n": 1}}}));
}

#[test]
fn put_patch_delete_use_their_own_method() {
    let server = format!("http://{}", start_server());
    let caller = caller();

    for (request, method) in [
        (ApiRequest::put("echo").with_body(body(json!({"a": "1"}))), "PUT"),
        (
            ApiRequest::patch("echo").with_payload(&json!({"x": 1})).unwrap(),
            "PATCH",
        ),
        (ApiRequest::delete("echo"), "DELETE"),
    ] {
        let response = caller.call(&request, &server, None).unwrap();
        let echo = response.first_resource().unwrap();
        assert_eq!(echo.attributes["method"], method);
    }

    let response = caller
        .call(
            &ApiRequest::put("echo").with_body(body(json!({"a": "1"}))),
            &server,
            None,
        )
        .unwrap();
    assert_eq!(response.first_resource().unwrap().attributes["body"], "a=1");
}

#[test]
fn host_and_test_environment_headers_reach_the_server() {
    let server = format!("http://{}", start_server());
    let config = CallerConfig::default().with_default_host_name("tester.internal");
    let caller = ApiCaller::with_config(UreqTransport::default(), config);
    let context = CallContext::new()
        .with_test_environment(true)
        .with_header("X-Custom", "1");

    let response = caller
        .call_with(&ApiRequest::get("echo"), &server, &context)
        .unwrap();

    let headers = &response.first_resource().unwrap().attributes["headers"];
    assert_eq!(headers["host"], json!(["tester.internal"]));
    assert_eq!(headers["test-environment"], json!(["1"]));
    assert_eq!(headers["x-custom"], json!(["1"]));
}

#[test]
fn multipart_upload_carries_files_body_and_payload() {
    let server = format!("http://{}", start_server());
    let mut first = tempfile::NamedTempFile::new().unwrap();
    first.write_all(b"first file").unwrap();
    let mut nested = tempfile::NamedTempFile::new().unwrap();
    nested.write_all(b"nested file").unwrap();

    let files = FileTree::new()
        .with_file("a", FileDescriptor::new(first.path(), "text/plain", "a.txt"))
        .with_group(
            "b",
            FileTree::new().with_file(
                "c",
                FileDescriptor::uploaded(nested.path(), "text/csv", "c.csv"),
            ),
        );
    let request = ApiRequest::post("upload")
        .with_files(files)
        .with_body(body(json!({"title": "report"})))
        .with_payload(&json!({"x": 1}))
        .unwrap();

    let response = caller().call(&request, &server, None).unwrap();

    assert_eq!(response.http_code(), StatusCode::CREATED);
    let parts = response.resources().unwrap();
    let ids: Vec<_> = parts.iter().map(|p| p.id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["a", "b[c]", "title", "payload"]);
    assert_eq!(parts[0].attributes["fileName"], "a.txt");
    assert_eq!(parts[0].attributes["content"], "first file");
    assert_eq!(parts[1].attributes["contentType"], "text/csv");
    assert_eq!(parts[1].attributes["content"], "nested file");
    assert_eq!(parts[2].attributes["content"], "report");
    assert_eq!(parts[3].attributes["content"], r#"{"x":1}"#);
}

#[test]
fn error_document_title_becomes_error() {
    let server = format!("http://{}", start_server());
    let response = caller()
        .call(&ApiRequest::get("missing"), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Not Found");
    assert_eq!(response.resource_count(), 0);
}

#[test]
fn plain_text_error_is_quoted() {
    let server = format!("http://{}", start_server());
    let response = caller()
        .call(&ApiRequest::get("broken"), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "API returned error: oops");
    assert_eq!(response.raw_response(), "oops");
    assert!(response.document().is_err());
}

#[test]
fn empty_body_has_no_resources() {
    let server = format!("http://{}", start_server());
    let response = caller()
        .call(&ApiRequest::get("empty"), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::OK);
    assert_eq!(response.resource_count(), 0);
    let err = response.first_resource().unwrap_err();
    assert_eq!(err.to_string(), "Response is empty");
    assert!(matches!(response.document(), Err(ApiError::EmptyResponse { .. })));
}

#[test]
fn body_over_ten_mebibytes_is_read_in_full() {
    let server = format!("http://{}", start_server());
    let response = caller()
        .call(&ApiRequest::get("large"), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::OK);
    assert_eq!(response.error(), "");
    assert_eq!(response.raw_response().len(), mock_server::LARGE_BODY_LEN);
}

#[test]
fn redirects_are_returned_not_followed() {
    let server = format!("http://{}", start_server());
    let response = caller()
        .call(&ApiRequest::get("redirect"), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::FOUND);
    assert_eq!(response.http_headers().first("location"), Some("/echo"));
    assert_eq!(response.resource_count(), 0);
}

#[test]
fn unreachable_server_yields_teapot() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let response = caller()
        .call(&ApiRequest::get("echo"), &format!("http://{addr}"), None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::IM_A_TEAPOT);
    assert!(response.error().starts_with("Transport error: "));
    assert_eq!(response.raw_response(), "");
    assert!(response.http_headers().is_empty());
}

#[test]
fn missing_upload_file_yields_teapot() {
    let server = format!("http://{}", start_server());
    let files = FileTree::new().with_file(
        "a",
        FileDescriptor::new("/nonexistent/api-caller/a.txt", "text/plain", "a.txt"),
    );
    let response = caller()
        .call(&ApiRequest::post("upload").with_files(files), &server, None)
        .unwrap();

    assert_eq!(response.http_code(), StatusCode::IM_A_TEAPOT);
    assert!(!response.error().is_empty());
}
