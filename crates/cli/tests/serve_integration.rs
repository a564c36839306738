//! Integration tests for the `orgchart serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port,
//! makes HTTP requests, and verifies the responses.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

const SINGLE_ROOT: &str =
    r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas"}"#;

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so separate test binaries don't
/// collide on the same port range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Kills the server when the test ends, pass or fail.
struct Server(Child);

impl Drop for Server {
    fn drop(&mut self) {
        self.0.kill().ok();
        self.0.wait().ok();
    }
}

/// Start `orgchart serve` on `port` with extra environment variables.
fn start_server(port: u16, env: &[(&str, &str)], extra_args: &[&str]) -> Server {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_orgchart"));
    cmd.args(["serve", "--host", "127.0.0.1", "--port", &port.to_string()]);
    cmd.args(extra_args);
    cmd.env_remove("ORGCHART_API_KEY");
    cmd.env_remove("ORGCHART_MAX_BODY_BYTES");
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().expect("failed to start orgchart serve");
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{port}")).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Server(child)
}

/// Send one request and return (status, body).
fn request(
    port: u16,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: impl AsRef<[u8]>,
) -> (u16, String) {
    let body = body.as_ref();
    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}")).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let mut header_lines = String::new();
    for (name, value) in headers {
        header_lines.push_str(&format!("{name}: {value}\r\n"));
    }
    let head = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost:{port}\r\n{header_lines}Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).expect("failed to write");
    stream.write_all(body).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);
    parse_http_response(&response)
}

fn http_get(port: u16, path: &str) -> (u16, String) {
    request(port, "GET", path, &[], "")
}

fn http_post(port: u16, path: &str, body: impl AsRef<[u8]>) -> (u16, String) {
    request(port, "POST", path, &[("Content-Type", "application/json")], body)
}

/// Parse an HTTP response into (status_code, body).
fn parse_http_response(response: &str) -> (u16, String) {
    let (headers, body) = response.split_once("\r\n\r\n").unwrap_or((response, ""));
    let status = headers
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);
    let body = if headers.to_ascii_lowercase().contains("transfer-encoding: chunked") {
        decode_chunked(body)
    } else {
        body.to_string()
    };
    (status, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(mut remaining: &str) -> String {
    let mut result = String::new();
    while let Some(line_end) = remaining.find("\r\n") {
        let Ok(size) = usize::from_str_radix(remaining[..line_end].trim(), 16) else {
            break;
        };
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        let end = (start + size).min(remaining.len());
        result.push_str(&remaining[start..end]);
        remaining = remaining.get(end + 2..).unwrap_or("");
    }
    result
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("valid JSON")
}

#[test]
fn health_returns_200() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_get(port, "/health");
    assert_eq!(status, 200);
    assert_eq!(json(&body)["status"], "ok");
}

#[test]
fn structure_stores_and_returns_hierarchy() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_post(port, "/api/v1/hierarchy/structure", SINGLE_ROOT);
    assert_eq!(status, 200);
    let body = json(&body);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["hierarchy"],
        serde_json::json!({"Jonas": {"Sophie": {"Nick": {"Pete": {}, "Barbara": {}}}}})
    );

    let (status, body) = http_get(port, "/api/v1/hierarchy");
    assert_eq!(status, 200);
    assert_eq!(
        json(&body)["hierarchy"],
        serde_json::json!({"Jonas": {"Sophie": {"Nick": {"Pete": {}, "Barbara": {}}}}})
    );

    let (status, body) = http_get(port, "/api/v1/hierarchy/employees/Barbara");
    assert_eq!(status, 200);
    let barbara = json(&body);
    assert_eq!(barbara["lft"], 6);
    assert_eq!(barbara["rgt"], 7);
}

#[test]
fn nested_set_queries() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);
    http_post(port, "/api/v1/hierarchy/structure", SINGLE_ROOT);

    let (status, body) = http_get(port, "/api/v1/hierarchy/employees/Pete/supervisors");
    assert_eq!(status, 200);
    let names: Vec<String> = json(&body)["supervisors"]
        .as_array()
        .expect("supervisors array")
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Jonas", "Sophie", "Nick"]);

    let (status, body) = http_get(port, "/api/v1/hierarchy/employees/Sophie/subordinates");
    assert_eq!(status, 200);
    let names: Vec<String> = json(&body)["subordinates"]
        .as_array()
        .expect("subordinates array")
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Nick", "Pete", "Barbara"]);
}

#[test]
fn unknown_employee_returns_404() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_get(port, "/api/v1/hierarchy/employees/Nobody");
    assert_eq!(status, 404);
    assert!(json(&body)["error"].as_str().unwrap().contains("Nobody"));
}

#[test]
fn duplicate_keys_rejected_and_table_kept() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);
    http_post(port, "/api/v1/hierarchy/structure", r#"{"Ham": "Peter"}"#);

    let (status, body) = http_post(
        port,
        "/api/v1/hierarchy/structure",
        r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas", "Barbara": "Nick", "Nick": "Sophie"}"#,
    );
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["error"], "duplicate_supervisor");
    assert_eq!(body["employees"], serde_json::json!(["Barbara", "Nick"]));

    let (_, body) = http_get(port, "/api/v1/hierarchy");
    assert_eq!(json(&body)["hierarchy"], serde_json::json!({"Peter": {"Ham": {}}}));
}

#[test]
fn multiple_roots_rejected() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_post(
        port,
        "/api/v1/hierarchy/structure",
        r#"{"Pete": "Nick", "Barbara": "Nick", "Nick": "Sophie", "Sophie": "Jonas", "Jane": "Reenah"}"#,
    );
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["error"], "multiple_roots");
    assert_eq!(body["roots"], serde_json::json!(["Jonas", "Reenah"]));
}

#[test]
fn empty_and_malformed_bodies_rejected() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_post(port, "/api/v1/hierarchy/structure", "");
    assert_eq!(status, 400);
    assert_eq!(json(&body)["error"], "empty_input");

    let (status, body) = http_post(port, "/api/v1/hierarchy/structure", "[1, 2]");
    assert_eq!(status, 400);
    assert_eq!(json(&body)["error"], "malformed_input");
}

#[test]
fn invalid_utf8_body_is_malformed_input() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_post(
        port,
        "/api/v1/hierarchy/structure",
        b"{\"Pete\": \"Ni\xffck\"}",
    );
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["error"], "malformed_input");

    let (_, body) = http_get(port, "/api/v1/hierarchy");
    assert_eq!(json(&body)["hierarchy"], serde_json::json!({}));
}

#[test]
fn oversized_body_rejected() {
    let port = next_port();
    let _server = start_server(port, &[], &["--max-body-bytes", "16"]);

    let (status, _) = http_post(port, "/api/v1/hierarchy/structure", SINGLE_ROOT);
    assert_eq!(status, 413);
}

#[test]
fn unknown_route_returns_404() {
    let port = next_port();
    let _server = start_server(port, &[], &[]);

    let (status, body) = http_get(port, "/nope");
    assert_eq!(status, 404);
    assert_eq!(json(&body)["error"], "not found");
}

#[test]
fn api_key_required_when_configured() {
    let port = next_port();
    let _server = start_server(port, &[("ORGCHART_API_KEY", "s3cret")], &[]);

    let (status, _) = http_get(port, "/health");
    assert_eq!(status, 200, "health is exempt from auth");

    let (status, _) = http_get(port, "/api/v1/hierarchy");
    assert_eq!(status, 401);

    let (status, _) = request(port, "GET", "/api/v1/hierarchy", &[("X-API-Key", "wrong")], "");
    assert_eq!(status, 403);

    let (status, _) = request(
        port,
        "GET",
        "/api/v1/hierarchy",
        &[("Authorization", "Bearer s3cret")],
        "",
    );
    assert_eq!(status, 200);

    let (status, _) = request(
        port,
        "POST",
        "/api/v1/hierarchy/structure",
        &[("X-API-Key", "s3cret")],
        SINGLE_ROOT,
    );
    assert_eq!(status, 200);
}
