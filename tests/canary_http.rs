//! Wire-level tests for `CanaryClient`
//!
//! A throwaway HTTP server on localhost answers the Views API calls with
//! canned JSON and records every request it receives.

use canary_browser::range::DateRange;
use canary_browser::service::{CanaryClient, ClientOptions, Credentials, QueryService, ServiceError};
use canary_browser::types::{SampleValue, TagPath};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

type Log = Arc<Mutex<Vec<(String, Value)>>>;

/// Start a server answering with `handler(endpoint, body)`
fn serve<F>(handler: F) -> (String, Log)
where
    F: Fn(&str, &Value) -> Value + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::default();
    let seen = Arc::clone(&log);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            if let Some((endpoint, body)) = read_request(&stream) {
                let reply = handler(&endpoint, &body);
                seen.lock().unwrap().push((endpoint, body));
                write_response(stream, &reply);
            }
        }
    });

    (format!("http://{addr}"), log)
}

fn read_request(stream: &TcpStream) -> Option<(String, Value)> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let path = request_line.split_whitespace().nth(1)?.to_string();

    let mut content_length = None;
    let mut chunked = false;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        match name.trim().to_ascii_lowercase().as_str() {
            "content-length" => content_length = value.trim().parse::<usize>().ok(),
            "transfer-encoding" => chunked = value.trim().eq_ignore_ascii_case("chunked"),
            _ => {}
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).ok()?;
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else {
        body.resize(content_length.unwrap_or(0), 0);
        reader.read_exact(&mut body).ok()?;
    }

    let endpoint = path.rsplit('/').next()?.to_string();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Some((endpoint, json))
}

fn write_response(mut stream: TcpStream, body: &Value) {
    let payload = body.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Canned historian with one paged tag and one missing tag
fn historian(endpoint: &str, body: &Value) -> Value {
    match endpoint {
        "getUserToken" => json!({"statusCode": "Good", "userToken": "tok-1"}),
        "revokeUserToken" => json!({"statusCode": "Good"}),
        "browseNodes" => match body.get("path").and_then(Value::as_str) {
            None => json!({"statusCode": "Good", "nodes": {"Plant": {}, "Office": {}}}),
            Some("Plant") => json!({"statusCode": "Good", "nodes": {"Temp": {}, "Flow": {}}}),
            Some(_) => json!({"statusCode": "Good", "nodes": {}}),
        },
        "browseTags" => match body.get("continuation") {
            None => json!({"statusCode": "Good", "tags": ["Plant.Temp"], "continuation": "more"}),
            Some(_) => json!({"statusCode": "Good", "tags": ["Plant.Flow"], "continuation": null}),
        },
        "getTagData" => {
            if body["tags"][0] == "Missing" {
                return json!({"statusCode": "BadNotFound", "errors": ["Tag 'Missing' not found"]});
            }
            match body.get("continuation") {
                None => json!({
                    "statusCode": "Good",
                    "data": {"Plant.Temp": [{"t": "2024-03-01T00:00:00Z", "v": 20.5}]},
                    "continuation": "page-2"
                }),
                Some(_) => json!({
                    "statusCode": "Good",
                    "data": {"Plant.Temp": [{"t": "2024-03-01T00:01:00+00:00", "v": null}]},
                    "continuation": null
                }),
            }
        }
        _ => json!({"statusCode": "BadUnknownEndpoint"}),
    }
}

fn client(base: &str, credentials: Credentials) -> CanaryClient {
    CanaryClient::new(base, credentials, ClientOptions::default()).unwrap()
}

fn endpoints(log: &Log) -> Vec<String> {
    log.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
}

#[test]
fn test_browse_keeps_server_order_and_revokes_token() {
    let (base, log) = serve(historian);
    let client = client(&base, Credentials::default());

    assert_eq!(client.browse_children(&TagPath::root()).unwrap(), ["Plant", "Office"]);
    assert_eq!(
        client.browse_children(&TagPath::parse("Plant")).unwrap(),
        ["Temp", "Flow"]
    );
    assert!(client.browse_children(&TagPath::parse("Plant.Temp")).unwrap().is_empty());

    assert_eq!(
        endpoints(&log)[..3],
        ["getUserToken", "browseNodes", "revokeUserToken"]
    );
    let requests = log.lock().unwrap();
    assert_eq!(requests[1].1, json!({"userToken": "tok-1"}));
    assert_eq!(requests[2].1, json!({"userToken": "tok-1"}));
    assert_eq!(requests[4].1["path"], "Plant");
}

#[test]
fn test_token_request_carries_credentials() {
    let (base, log) = serve(historian);
    let credentials = Credentials {
        username: Some("operator".into()),
        password: Some("secret".into()),
    };
    client(&base, credentials).browse_children(&TagPath::root()).unwrap();

    let requests = log.lock().unwrap();
    let token_request = &requests[0].1;
    assert_eq!(token_request["username"], "operator");
    assert_eq!(token_request["password"], "secret");
    assert_eq!(token_request["application"], "canary-browser");
    assert!(token_request.get("timezone").is_none());
}

#[test]
fn test_tag_data_follows_continuation() {
    let (base, log) = serve(historian);
    let client = client(&base, Credentials::default());
    let range = DateRange::explicit("2024-03-01", "2024-03-02").unwrap();

    let points = client.fetch_tag_data("Plant.Temp", Some(&range)).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].value, SampleValue::Number(20.5));
    assert_eq!(points[1].value, SampleValue::Null);

    let requests = log.lock().unwrap();
    let data_requests: Vec<&Value> = requests
        .iter()
        .filter(|(e, _)| e == "getTagData")
        .map(|(_, b)| b)
        .collect();
    assert_eq!(data_requests.len(), 2);
    assert_eq!(data_requests[0]["startTime"], "2024-03-01T00:00:00Z");
    assert_eq!(data_requests[0]["endTime"], "2024-03-02T00:00:00Z");
    assert_eq!(data_requests[0]["maxSize"], 10_000);
    assert!(data_requests[0].get("continuation").is_none());
    assert_eq!(data_requests[1]["continuation"], "page-2");
}

#[test]
fn test_fetch_without_range_omits_times() {
    let (base, log) = serve(historian);
    client(&base, Credentials::default())
        .fetch_tag_data("Plant.Temp", None)
        .unwrap();

    let requests = log.lock().unwrap();
    let first = &requests[1].1;
    assert!(first.get("startTime").is_none());
    assert!(first.get("endTime").is_none());
}

#[test]
fn test_search_collects_all_pages() {
    let (base, log) = serve(historian);
    let tags = client(&base, Credentials::default()).search_tags("", true).unwrap();

    assert_eq!(tags, ["Plant.Temp", "Plant.Flow"]);
    let requests = log.lock().unwrap();
    assert_eq!(requests[1].1["deep"], true);
    assert_eq!(requests[1].1["search"], "");
}

#[test]
fn test_bad_status_is_api_error_and_token_is_revoked() {
    let (base, log) = serve(historian);
    let err = client(&base, Credentials::default())
        .fetch_tag_data("Missing", None)
        .unwrap_err();

    match err {
        ServiceError::Api { operation, message } => {
            assert_eq!(operation, "getTagData");
            assert!(message.contains("not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(endpoints(&log).last().map(String::as_str), Some("revokeUserToken"));
}

#[test]
fn test_refused_token_is_error() {
    let (base, _log) = serve(|endpoint, _| match endpoint {
        "getUserToken" => json!({"statusCode": "BadUserAccessDenied", "errors": ["Access denied"]}),
        _ => json!({"statusCode": "Good"}),
    });
    let err = client(&base, Credentials::default())
        .browse_children(&TagPath::root())
        .unwrap_err();
    assert!(err.to_string().contains("Access denied"));
}

#[test]
fn test_unreachable_server_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"), Credentials::default())
        .browse_children(&TagPath::root())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Http { operation: "getUserToken", .. }));
}
